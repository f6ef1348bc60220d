//! Periodic removal of expired refresh records
//!
//! Lookups already reject expired records, so sweeping only reclaims
//! storage. A failed sweep is logged and retried on the next tick.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use wc_shared::config::SessionConfig;

use crate::errors::DomainError;
use crate::repositories::TokenStore;

/// Configuration for the token sweeper
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// How often to sweep (in seconds)
    pub interval_seconds: u64,
    /// Whether to sweep at all
    pub enabled: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            enabled: true,
        }
    }
}

impl From<&SessionConfig> for SweeperConfig {
    fn from(session: &SessionConfig) -> Self {
        Self {
            interval_seconds: session.sweep_interval_seconds,
            enabled: session.sweep_enabled,
        }
    }
}

/// Removes expired records from a token store
pub struct TokenSweeper<S: TokenStore + 'static> {
    store: Arc<S>,
    config: SweeperConfig,
}

impl<S: TokenStore> TokenSweeper<S> {
    pub fn new(store: Arc<S>, config: SweeperConfig) -> Self {
        Self { store, config }
    }

    /// Run a single sweep cycle
    pub async fn run_sweep(&self) -> Result<SweepResult, DomainError> {
        if !self.config.enabled {
            return Ok(SweepResult::default());
        }

        let now = Utc::now();
        let removed = self
            .store
            .sweep_expired(now)
            .await
            .map_err(DomainError::from_store)?;

        info!(removed, "Expired refresh records swept");

        Ok(SweepResult {
            removed,
            swept_at: Some(now),
        })
    }

    /// Spawn a tokio task that sweeps at the configured interval
    ///
    /// Returns `None` when sweeping is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Token sweeper is disabled");
            return None;
        }

        let interval = Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval_seconds,
                "Token sweeper started"
            );

            let mut timer = tokio::time::interval(interval);

            loop {
                timer.tick().await;

                if let Err(e) = self.run_sweep().await {
                    error!(error = %e, "Token sweep failed");
                }
            }
        }))
    }
}

/// Result of a sweep cycle
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepResult {
    /// Number of expired records deleted
    pub removed: usize,
    /// Reference time used for the sweep; `None` if sweeping is disabled
    pub swept_at: Option<DateTime<Utc>>,
}

impl SweepResult {
    /// Whether a sweep actually ran
    pub fn ran(&self) -> bool {
        self.swept_at.is_some()
    }
}
