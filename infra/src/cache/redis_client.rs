//! Redis client wrapper
//!
//! Owns a multiplexed connection to the Redis server that backs the refresh
//! record store. Connecting retries with exponential backoff; individual
//! commands do not, so a failed command surfaces to the caller at once.

use redis::{aio::MultiplexedConnection, Client, RedisError};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use wc_shared::config::CacheConfig;

use crate::InfrastructureError;

const DEFAULT_CONNECT_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 100;
const MAX_RETRY_DELAY_MS: u64 = 5000;

/// Redis client with a shared multiplexed connection
#[derive(Clone)]
pub struct RedisClient {
    /// Multiplexed connection, cheap to clone per request
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisClient {
    /// Connect using the default retry policy (3 attempts, 100ms base delay)
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        Self::new_with_retry_config(config, DEFAULT_CONNECT_ATTEMPTS, DEFAULT_RETRY_DELAY_MS).await
    }

    /// Connect with a custom retry policy
    ///
    /// # Arguments
    /// * `config` - Cache configuration settings
    /// * `max_attempts` - Connection attempts before giving up
    /// * `retry_delay_ms` - Base delay between attempts, doubled each time up to 5s
    pub async fn new_with_retry_config(
        config: CacheConfig,
        max_attempts: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Creating Redis client");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!(error = %e, "Failed to parse Redis URL");
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::connect_with_retry(
            &client,
            Duration::from_secs(config.connection_timeout),
            max_attempts.max(1),
            retry_delay_ms,
        )
        .await?;

        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    async fn connect_with_retry(
        client: &Client,
        connect_timeout: Duration,
        max_attempts: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Connecting to Redis");

            let result = match timeout(connect_timeout, client.get_multiplexed_async_connection())
                .await
            {
                Ok(result) => result,
                Err(_) => Err(RedisError::from(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "Redis connection timed out",
                ))),
            };

            match result {
                Ok(connection) => return Ok(connection),
                Err(e) if attempts < max_attempts && is_retriable_error(&e) => {
                    warn!(
                        attempt = attempts,
                        max_attempts,
                        delay_ms = delay,
                        error = %e,
                        "Failed to connect to Redis, retrying"
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!(attempts, error = %e, "Failed to connect to Redis");
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// A handle on the shared connection
    pub fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Apply the configured prefix to a key
    pub fn make_key(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    /// PING the server
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let mut conn = self.connection();
        let response: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(response == "PONG")
    }
}

/// Errors worth another connection attempt
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Hide credentials in a Redis URL before logging it
pub(crate) fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(proto_end), Some(at_pos)) if at_pos > proto_end => {
            format!("{}****{}", &url[..proto_end + 3], &url[at_pos..])
        }
        _ => url.to_string(),
    }
}
