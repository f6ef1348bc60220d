//! Configuration module with business-specific sub-modules
//!
//! - `auth` - Token signing and session housekeeping
//! - `cache` - Redis connection for the refresh record store
//! - `database` - MySQL pool configuration
//! - `environment` - Environment detection and logging configuration
//!
//! Values are layered: built-in defaults, then `config.<environment>.toml`
//! if present, then `WC__`-prefixed environment variables
//! (for example `WC__AUTH__JWT__SECRET`).

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;

use serde::{Deserialize, Serialize};

pub use ::config::ConfigError;
pub use auth::{AuthConfig, JwtConfig, SessionConfig, MAX_TOKEN_EXPIRY_SECONDS};
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

const ENV_PREFIX: &str = "WC";
const ENV_SEPARATOR: &str = "__";

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Defaults tuned for the given environment
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            environment,
            auth: AuthConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let environment = Environment::from_env();
        Self {
            environment,
            auth: AuthConfig::from_env(),
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load layered configuration for the detected environment
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load_for(Environment::from_env())
    }

    /// Load layered configuration for an explicit environment
    pub fn load_for(environment: Environment) -> Result<Self, ConfigError> {
        let defaults = ::config::Config::try_from(&Self::for_environment(environment))?;

        let config: Self = ::config::Config::builder()
            .add_source(defaults)
            .add_source(::config::File::with_name(environment.config_file()).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot issue usable tokens
    pub fn validate(&self) -> Result<(), ConfigError> {
        let jwt = &self.auth.jwt;
        if jwt.access_token_expiry <= 0 {
            return Err(ConfigError::Message(
                "auth.jwt.access_token_expiry must be positive".into(),
            ));
        }
        if !jwt.has_valid_expiry_range() {
            return Err(ConfigError::Message(format!(
                "auth.jwt token expiries must not exceed {} seconds",
                MAX_TOKEN_EXPIRY_SECONDS
            )));
        }
        if jwt.refresh_token_expiry <= jwt.access_token_expiry {
            return Err(ConfigError::Message(
                "auth.jwt.refresh_token_expiry must exceed access_token_expiry".into(),
            ));
        }
        if self.environment.is_production() && jwt.is_using_default_secret() {
            return Err(ConfigError::Message(
                "auth.jwt.secret must be set in production".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.auth.jwt.access_token_expiry, 3600);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_default_secret_in_production() {
        let config = AppConfig::for_environment(Environment::Production);
        assert!(config.validate().is_err());

        let mut config = config;
        config.auth.jwt.secret = String::from("a-real-production-secret-value");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_lifetimes() {
        let mut config = AppConfig::default();
        config.auth.jwt.refresh_token_expiry = 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_lifetime() {
        let mut config = AppConfig::default();
        config.auth.jwt.refresh_token_expiry = 10_000_000_000_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_for_staging_uses_defaults_without_file() {
        let config = AppConfig::load_for(Environment::Staging).unwrap();
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.auth.jwt.issuer, "waf-console");
    }
}
