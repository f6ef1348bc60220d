//! Authentication response value object for API responses.

use serde::{Deserialize, Serialize};

use crate::domain::entities::principal::{Principal, UserRole};
use crate::domain::entities::token::{TokenPair, TOKEN_TYPE_BEARER};

/// Public view of a user returned alongside tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub profile_image: Option<String>,
    pub role: UserRole,
}

impl From<&Principal> for UserProfile {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id.clone(),
            email: principal.email.clone(),
            name: principal.name.clone(),
            profile_image: principal.profile_image.clone(),
            role: principal.role,
        }
    }
}

/// Authentication response containing tokens and user metadata
///
/// Returned after a successful login. On refresh the profile is omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// JWT access token for API authentication
    pub access_token: String,

    /// JWT refresh token for obtaining new access tokens
    pub refresh_token: String,

    /// Access token expiration time in seconds
    pub expires_in: i64,

    /// Always "Bearer"
    pub token_type: String,

    /// Profile of the authenticated user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
}

impl AuthResponse {
    /// Creates an authentication response from a token pair and an optional profile
    pub fn from_token_pair(token_pair: TokenPair, user_profile: Option<UserProfile>) -> Self {
        Self {
            access_token: token_pair.access_token,
            refresh_token: token_pair.refresh_token,
            expires_in: token_pair.expires_in,
            token_type: token_pair.token_type,
            user_profile,
        }
    }

    /// Whether the response uses the bearer scheme
    pub fn is_bearer(&self) -> bool {
        self.token_type == TOKEN_TYPE_BEARER
    }
}
