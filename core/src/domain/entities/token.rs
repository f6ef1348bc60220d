//! Token entities for JWT-based sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::principal::{Principal, UserRole};

/// Access token expiration time (1 hour)
pub const ACCESS_TOKEN_EXPIRY_SECONDS: i64 = 3600;

/// Refresh token expiration time (30 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

/// JWT issuer
pub const JWT_ISSUER: &str = "waf-console";

/// JWT audience
pub const JWT_AUDIENCE: &str = "waf-console-api";

/// Token type reported to clients
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Purpose of a signed token, carried in the `typ` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Role of the subject; access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// JWT ID; for refresh tokens this is the refresh record id
    pub jti: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Access or refresh
    pub typ: TokenKind,
}

impl TokenClaims {
    /// Claims for an access token, carrying the principal's role
    pub fn access(
        principal: &Principal,
        jti: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: principal.id.clone(),
            role: Some(principal.role),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: jti.into(),
            iss: JWT_ISSUER.to_string(),
            aud: JWT_AUDIENCE.to_string(),
            typ: TokenKind::Access,
        }
    }

    /// Claims for a refresh token. Only the subject and record id are
    /// embedded so the role is looked up again on refresh.
    pub fn refresh(record: &RefreshRecord) -> Self {
        Self {
            sub: record.subject.clone(),
            role: None,
            iat: record.issued_at.timestamp(),
            exp: record.expires_at.timestamp(),
            jti: record.token_id.clone(),
            iss: JWT_ISSUER.to_string(),
            aud: JWT_AUDIENCE.to_string(),
            typ: TokenKind::Refresh,
        }
    }

    /// Override issuer and audience
    pub fn with_issuer(mut self, issuer: &str, audience: &str) -> Self {
        self.iss = issuer.to_string();
        self.aud = audience.to_string();
        self
    }
}

/// Server-side state of one issued refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRecord {
    /// Unique identifier, equal to the token's `jti`
    pub token_id: String,

    /// User ID this token belongs to
    pub subject: String,

    /// Timestamp when the token was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp when the token expires
    pub expires_at: DateTime<Utc>,

    /// Whether the token has been revoked
    pub revoked: bool,

    /// Id of the record that superseded this one on rotation
    pub replaced_by: Option<String>,
}

impl RefreshRecord {
    /// Creates a new active record
    pub fn new(
        token_id: impl Into<String>,
        subject: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token_id: token_id.into(),
            subject: subject.into(),
            issued_at,
            expires_at,
            revoked: false,
            replaced_by: None,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Not revoked and not expired at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired_at(now)
    }

    /// Revokes the record. Revocation is permanent.
    pub fn revoke(&mut self) {
        self.revoked = true;
    }

    /// Revokes the record and links it to its successor
    pub fn rotate_to(&mut self, new_token_id: impl Into<String>) {
        self.revoked = true;
        self.replaced_by = Some(new_token_id.into());
    }
}

/// Token pair returned on login and refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Always "Bearer"
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    /// Creates a new bearer token pair
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_in: i64,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in,
            refresh_expires_in,
        }
    }
}
