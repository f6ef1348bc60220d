//! In-memory implementation of TokenStore

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::token::RefreshRecord;
use crate::errors::StoreError;

use super::r#trait::TokenStore;

/// Process-local token store
///
/// A single write lock guards every mutation, which makes `rotate`
/// indivisible. Suitable for tests and single-instance deployments.
#[derive(Clone, Default)]
pub struct InMemoryTokenStore {
    records: Arc<RwLock<HashMap<String, RefreshRecord>>>,
}

impl InMemoryTokenStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, including revoked and expired ones
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn not_found(token_id: &str) -> StoreError {
    StoreError::NotFound {
        token_id: token_id.to_string(),
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn record(&self, record: RefreshRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;

        if records.contains_key(&record.token_id) {
            return Err(StoreError::DuplicateId {
                token_id: record.token_id,
            });
        }

        records.insert(record.token_id.clone(), record);
        Ok(())
    }

    async fn lookup(&self, token_id: &str) -> Result<RefreshRecord, StoreError> {
        let records = self.records.read().await;

        match records.get(token_id) {
            Some(record) if !record.is_expired_at(Utc::now()) => Ok(record.clone()),
            Some(_) => {
                debug!(token_id, "Refresh record expired");
                Err(not_found(token_id))
            }
            None => Err(not_found(token_id)),
        }
    }

    async fn revoke(&self, token_id: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;

        let record = records.get_mut(token_id).ok_or_else(|| not_found(token_id))?;
        record.revoke();
        Ok(())
    }

    async fn rotate(
        &self,
        old_token_id: &str,
        new_record: RefreshRecord,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let now = Utc::now();

        // Validate everything before mutating anything
        match records.get(old_token_id) {
            None => return Err(not_found(old_token_id)),
            Some(old) if old.is_expired_at(now) => return Err(not_found(old_token_id)),
            Some(old) if old.revoked => {
                return Err(StoreError::AlreadyRevoked {
                    token_id: old_token_id.to_string(),
                })
            }
            Some(_) => {}
        }
        if records.contains_key(&new_record.token_id) {
            return Err(StoreError::DuplicateId {
                token_id: new_record.token_id,
            });
        }

        if let Some(old) = records.get_mut(old_token_id) {
            old.rotate_to(new_record.token_id.clone());
        }
        records.insert(new_record.token_id.clone(), new_record);
        Ok(())
    }

    async fn revoke_subject(&self, subject: &str) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let now = Utc::now();

        let mut revoked = 0;
        for record in records.values_mut() {
            if record.subject == subject && record.is_active_at(now) {
                record.revoke();
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn active_for_subject(&self, subject: &str) -> Result<Vec<RefreshRecord>, StoreError> {
        let records = self.records.read().await;
        let now = Utc::now();

        Ok(records
            .values()
            .filter(|r| r.subject == subject && r.is_active_at(now))
            .cloned()
            .collect())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;

        let before = records.len();
        records.retain(|_, r| !r.is_expired_at(now));
        Ok(before - records.len())
    }
}
