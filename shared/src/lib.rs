//! Shared configuration and tracing bootstrap for the WAF Console backend
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types and layered loading
//! - Tracing subscriber initialization

pub mod config;
pub mod telemetry;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, ConfigError, DatabaseConfig, Environment, JwtConfig,
    LogFormat, LoggingConfig, SessionConfig,
};
pub use telemetry::init_tracing;
