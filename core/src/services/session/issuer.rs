//! Issues fresh sessions for verified principals

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use crate::domain::entities::principal::Principal;
use crate::domain::entities::token::{RefreshRecord, TokenPair};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::TokenStore;
use crate::services::token::TokenCodec;

/// Creates a new session (access + refresh token) per call
///
/// Every call records one new refresh record and nothing else, so a retry
/// after a failure simply yields an independent session.
pub struct SessionIssuer<S: TokenStore> {
    store: Arc<S>,
    codec: Arc<TokenCodec>,
}

impl<S: TokenStore> SessionIssuer<S> {
    pub fn new(store: Arc<S>, codec: Arc<TokenCodec>) -> Self {
        Self { store, codec }
    }

    /// Issue a token pair for an already authenticated principal
    pub async fn issue(&self, principal: &Principal) -> DomainResult<TokenPair> {
        let now = Utc::now();
        let record = self.codec.new_refresh_record(&principal.id, now);

        self.store
            .record(record.clone())
            .await
            .map_err(DomainError::from_store)?;

        let pair = mint_pair(&self.codec, principal, &record, now)?;

        info!(
            subject = %principal.id,
            token_id = %record.token_id,
            role = %principal.role,
            "Session issued"
        );

        Ok(pair)
    }
}

/// Encode the access and refresh tokens for a stored refresh record
pub(crate) fn mint_pair(
    codec: &TokenCodec,
    principal: &Principal,
    record: &RefreshRecord,
    now: DateTime<Utc>,
) -> DomainResult<TokenPair> {
    let access_token = codec.encode(&codec.access_claims(principal, now))?;
    let refresh_token = codec.encode(&codec.refresh_claims(record))?;

    Ok(TokenPair::new(
        access_token,
        refresh_token,
        codec.access_ttl_seconds(),
        codec.refresh_ttl_seconds(),
    ))
}
