//! Token store trait defining the contract for refresh record persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::token::RefreshRecord;
use crate::errors::StoreError;

/// Store of issued refresh records, keyed by token id
///
/// The store is the only shared mutable state of the session engine.
/// Every operation on a single token id must be linearizable; in particular
/// two concurrent `rotate` calls on the same old id must not both succeed.
///
/// Expiry is always re-checked on read, so a backend that never sweeps
/// still rejects expired records.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Insert a new refresh record
    ///
    /// # Returns
    /// * `Ok(())` - Record stored
    /// * `Err(StoreError::DuplicateId)` - A record with the same id exists
    async fn record(&self, record: RefreshRecord) -> Result<(), StoreError>;

    /// Fetch a record by id
    ///
    /// Revoked records are returned so callers can detect reuse.
    ///
    /// # Returns
    /// * `Ok(RefreshRecord)` - Record found and not expired
    /// * `Err(StoreError::NotFound)` - Absent or expired
    async fn lookup(&self, token_id: &str) -> Result<RefreshRecord, StoreError>;

    /// Mark a record revoked
    ///
    /// Revoking an already revoked record is a no-op.
    ///
    /// # Returns
    /// * `Ok(())` - Record is revoked
    /// * `Err(StoreError::NotFound)` - No record with this id
    async fn revoke(&self, token_id: &str) -> Result<(), StoreError>;

    /// Atomically revoke `old_token_id`, link it to `new_record` and store
    /// `new_record`. Observers see either both changes or neither.
    ///
    /// # Returns
    /// * `Ok(())` - Rotation committed
    /// * `Err(StoreError::NotFound)` - Old record absent or expired
    /// * `Err(StoreError::AlreadyRevoked)` - Old record was already revoked; nothing changed
    /// * `Err(StoreError::DuplicateId)` - New id already exists; nothing changed
    async fn rotate(&self, old_token_id: &str, new_record: RefreshRecord)
        -> Result<(), StoreError>;

    /// Revoke every active record of a subject
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records newly revoked
    async fn revoke_subject(&self, subject: &str) -> Result<usize, StoreError>;

    /// List the active (not revoked, not expired) records of a subject
    async fn active_for_subject(&self, subject: &str) -> Result<Vec<RefreshRecord>, StoreError>;

    /// Delete records that expired at or before `now`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records removed
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError>;

    /// Count active records for a subject
    async fn count_active(&self, subject: &str) -> Result<usize, StoreError> {
        Ok(self.active_for_subject(subject).await?.len())
    }
}
