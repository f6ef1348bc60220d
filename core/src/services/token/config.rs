//! Configuration for the token codec

use chrono::Duration;
use jsonwebtoken::Algorithm;
use std::str::FromStr;

use wc_shared::config::{JwtConfig, MAX_TOKEN_EXPIRY_SECONDS};

use crate::domain::entities::token::{
    ACCESS_TOKEN_EXPIRY_SECONDS, JWT_AUDIENCE, JWT_ISSUER, REFRESH_TOKEN_EXPIRY_DAYS,
};
use crate::errors::TokenError;

/// Configuration for the token codec and session lifetimes
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing secret (HMAC algorithms)
    pub jwt_secret: String,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Access token lifetime in seconds
    pub access_token_ttl_seconds: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl_seconds: i64,
    /// `iss` claim written and required
    pub issuer: String,
    /// `aud` claim written and required
    pub audience: String,
    /// Leeway applied to `exp` when decoding
    pub clock_skew_seconds: u64,
    /// PEM private key path (RSA algorithms)
    pub private_key_path: Option<String>,
    /// PEM public key path (RSA algorithms)
    pub public_key_path: Option<String>,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret-please-change-in-production".to_string(),
            algorithm: Algorithm::HS256,
            access_token_ttl_seconds: ACCESS_TOKEN_EXPIRY_SECONDS,
            refresh_token_ttl_seconds: REFRESH_TOKEN_EXPIRY_DAYS * 86400,
            issuer: JWT_ISSUER.to_string(),
            audience: JWT_AUDIENCE.to_string(),
            clock_skew_seconds: 30,
            private_key_path: None,
            public_key_path: None,
        }
    }
}

impl TokenServiceConfig {
    /// Build from the shared JWT configuration
    pub fn from_jwt_config(jwt: &JwtConfig) -> Result<Self, TokenError> {
        let algorithm = Algorithm::from_str(&jwt.algorithm.to_ascii_uppercase()).map_err(|_| {
            TokenError::KeyLoad {
                message: format!("Unsupported JWT algorithm: {}", jwt.algorithm),
            }
        })?;

        if !jwt.has_valid_expiry_range() {
            return Err(TokenError::KeyLoad {
                message: format!(
                    "Token expiry out of range: access {}s, refresh {}s",
                    jwt.access_token_expiry, jwt.refresh_token_expiry
                ),
            });
        }

        Ok(Self {
            jwt_secret: jwt.secret.clone(),
            algorithm,
            access_token_ttl_seconds: jwt.access_token_expiry,
            refresh_token_ttl_seconds: jwt.refresh_token_expiry,
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
            clock_skew_seconds: jwt.clock_skew_seconds,
            private_key_path: jwt.private_key_path.clone(),
            public_key_path: jwt.public_key_path.clone(),
        })
    }

    /// Access lifetime, clamped to `0..=MAX_TOKEN_EXPIRY_SECONDS`
    pub fn access_ttl(&self) -> Duration {
        bounded_ttl(self.access_token_ttl_seconds)
    }

    /// Refresh lifetime, clamped to `0..=MAX_TOKEN_EXPIRY_SECONDS`
    pub fn refresh_ttl(&self) -> Duration {
        bounded_ttl(self.refresh_token_ttl_seconds)
    }
}

fn bounded_ttl(seconds: i64) -> Duration {
    Duration::seconds(seconds.clamp(0, MAX_TOKEN_EXPIRY_SECONDS))
}
