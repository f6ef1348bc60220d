//! Principal entity representing the authenticated identity behind a session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role granted to a console user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Default role for new accounts
    #[default]
    FreeUser,
    /// Paid subscription
    PremiumUser,
    /// Console administrator
    Admin,
}

impl UserRole {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::FreeUser => "FREE_USER",
            UserRole::PremiumUser => "PREMIUM_USER",
            UserRole::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FREE_USER" => Ok(UserRole::FreeUser),
            "PREMIUM_USER" => Ok(UserRole::PremiumUser),
            "ADMIN" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

/// Verified identity handed to the session issuer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable user identifier, used as the token subject
    pub id: String,

    /// Current role of the user
    pub role: UserRole,

    /// Account email
    #[serde(default)]
    pub email: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Avatar URL, if the identity provider supplied one
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl Principal {
    /// Creates a principal with only an id and a role
    pub fn new(id: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            role,
            email: String::new(),
            name: String::new(),
            profile_image: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_profile_image(mut self, url: impl Into<String>) -> Self {
        self.profile_image = Some(url.into());
        self
    }
}
