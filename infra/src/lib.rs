//! # Infrastructure Layer
//!
//! Persistent `TokenStore` backends for the WAF Console session engine.
//!
//! - **Database**: MySQL store using SQLx; rotation runs in a transaction
//!   guarded by a conditional `UPDATE`
//! - **Cache**: Redis store; every mutation is a Lua script, so it runs
//!   atomically on the server, and records carry a TTL
//!
//! ## Features
//!
//! - `mysql`: Enable the MySQL store (default)
//! - `redis-cache`: Enable the Redis store (default)

use wc_core::errors::StoreError;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Cache module - Redis client and store
#[cfg(feature = "redis-cache")]
pub mod cache;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[cfg(feature = "mysql")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[cfg(feature = "redis-cache")]
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for StoreError {
    fn from(error: InfrastructureError) -> Self {
        StoreError::unavailable(error)
    }
}
