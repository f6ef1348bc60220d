//! Token signing and session lifecycle configuration

use serde::{Deserialize, Serialize};

const DEFAULT_SECRET: &str = "defaultSecretKeyForDevelopmentUseOnly123456789";

/// Longest accepted token lifetime, in seconds (10 years)
pub const MAX_TOKEN_EXPIRY_SECONDS: i64 = 10 * 365 * 86400;

/// JWT signing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret used for HMAC signing
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,

    /// Algorithm for JWT signing (HS256, HS384, HS512 or RS256)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Tolerated clock drift between issuer and validator, in seconds
    #[serde(default = "default_clock_skew")]
    pub clock_skew_seconds: u64,

    /// PEM private key path, required for RS256
    #[serde(default)]
    pub private_key_path: Option<String>,

    /// PEM public key path, required for RS256
    #[serde(default)]
    pub public_key_path: Option<String>,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_SECRET),
            access_token_expiry: 3600,       // 1 hour
            refresh_token_expiry: 2_592_000, // 30 days
            issuer: String::from("waf-console"),
            audience: String::from("waf-console-api"),
            algorithm: default_algorithm(),
            clock_skew_seconds: default_clock_skew(),
            private_key_path: None,
            public_key_path: None,
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            access_token_expiry: env_parse("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_parse(
                "JWT_REFRESH_TOKEN_EXPIRY",
                defaults.refresh_token_expiry,
            ),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or(defaults.algorithm),
            clock_skew_seconds: env_parse("JWT_CLOCK_SKEW_SECONDS", defaults.clock_skew_seconds),
            private_key_path: std::env::var("JWT_PRIVATE_KEY_PATH").ok(),
            public_key_path: std::env::var("JWT_PUBLIC_KEY_PATH").ok(),
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Both lifetimes positive and no longer than `MAX_TOKEN_EXPIRY_SECONDS`
    pub fn has_valid_expiry_range(&self) -> bool {
        let in_range = |seconds: i64| seconds > 0 && seconds <= MAX_TOKEN_EXPIRY_SECONDS;
        in_range(self.access_token_expiry) && in_range(self.refresh_token_expiry)
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

/// Refresh session housekeeping configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Whether the background sweep of expired refresh records runs
    #[serde(default = "default_sweep_enabled")]
    pub sweep_enabled: bool,

    /// Seconds between two sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sweep_enabled: default_sweep_enabled(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

impl SessionConfig {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sweep_enabled: env_parse("SESSION_SWEEP_ENABLED", defaults.sweep_enabled),
            sweep_interval_seconds: env_parse(
                "SESSION_SWEEP_INTERVAL_SECONDS",
                defaults.sweep_interval_seconds,
            ),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            session: SessionConfig::from_env(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(fallback)
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_clock_skew() -> u64 {
    30
}

fn default_sweep_enabled() -> bool {
    true
}

fn default_sweep_interval() -> u64 {
    3600 // 1 hour
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_default() {
        let config = JwtConfig::default();
        assert_eq!(config.access_token_expiry, 3600);
        assert_eq!(config.refresh_token_expiry, 30 * 86400);
        assert_eq!(config.algorithm, "HS256");
        assert_eq!(config.clock_skew_seconds, 30);
        assert!(config.is_using_default_secret());
    }

    #[test]
    fn test_jwt_config_builder() {
        let config = JwtConfig::new("my-secret")
            .with_access_expiry_minutes(15)
            .with_refresh_expiry_days(14);

        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 1_209_600);
        assert!(!config.is_using_default_secret());
    }

    #[test]
    fn test_expiry_range() {
        assert!(JwtConfig::default().has_valid_expiry_range());

        let too_long = JwtConfig {
            refresh_token_expiry: 10_000_000_000_000,
            ..Default::default()
        };
        assert!(!too_long.has_valid_expiry_range());

        let negative = JwtConfig {
            access_token_expiry: -1,
            ..Default::default()
        };
        assert!(!negative.has_valid_expiry_range());
    }

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert!(config.sweep_enabled);
        assert_eq!(config.sweep_interval_seconds, 3600);
    }

    #[test]
    fn test_auth_config_partial_deserialize() {
        // No `session` table and no optional jwt keys: serde defaults fill them in
        let source = ::config::Config::builder()
            .set_default("jwt.secret", "s3cret")
            .and_then(|b| b.set_default("jwt.access_token_expiry", 900_i64))
            .and_then(|b| b.set_default("jwt.refresh_token_expiry", 86400_i64))
            .and_then(|b| b.set_default("jwt.issuer", "waf-console"))
            .and_then(|b| b.set_default("jwt.audience", "waf-console-api"))
            .and_then(|b| b.build())
            .unwrap();
        let config: AuthConfig = source.try_deserialize().unwrap();

        assert_eq!(config.jwt.secret, "s3cret");
        assert_eq!(config.jwt.algorithm, "HS256");
        assert_eq!(config.jwt.clock_skew_seconds, 30);
        assert!(config.jwt.private_key_path.is_none());
        assert!(config.session.sweep_enabled);
    }
}
