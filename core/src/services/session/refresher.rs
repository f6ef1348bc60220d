//! Refresh token rotation with reuse detection

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domain::entities::token::{RefreshRecord, TokenKind, TokenPair};
use crate::errors::{DomainError, DomainResult, StoreError};
use crate::repositories::{PrincipalResolver, TokenStore};
use crate::services::token::TokenCodec;

use super::issuer::mint_pair;

/// Exchanges a refresh token for a new pair, rotating the refresh record
///
/// A refresh token is accepted at most once. Presenting a revoked one is
/// treated as theft: every active session of the subject is revoked and
/// the call fails with `TokenReuseDetected`.
///
/// `refresh` is not safe to retry after `StoreUnavailable`; the rotation
/// may have committed, so the caller should re-authenticate instead.
pub struct SessionRefresher<S: TokenStore, P: PrincipalResolver> {
    store: Arc<S>,
    principals: Arc<P>,
    codec: Arc<TokenCodec>,
}

impl<S: TokenStore, P: PrincipalResolver> SessionRefresher<S, P> {
    pub fn new(store: Arc<S>, principals: Arc<P>, codec: Arc<TokenCodec>) -> Self {
        Self {
            store,
            principals,
            codec,
        }
    }

    /// Validate and rotate a refresh token, returning a new pair
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let claims = self
            .codec
            .decode_kind(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                debug!(error = %e, "Refresh token rejected by codec");
                DomainError::InvalidToken
            })?;

        let record = match self.store.lookup(&claims.jti).await {
            Ok(record) => record,
            Err(StoreError::NotFound { .. }) => {
                debug!(token_id = %claims.jti, "Refresh record not found");
                return Err(DomainError::InvalidToken);
            }
            Err(e) => return Err(DomainError::from_store(e)),
        };

        if record.subject != claims.sub {
            warn!(token_id = %record.token_id, "Refresh token subject does not match its record");
            return Err(DomainError::InvalidToken);
        }

        if record.revoked {
            return Err(self.contain_reuse(&record).await);
        }

        // Re-derive the role; nothing is committed if the user is gone
        let principal = self
            .principals
            .resolve(&record.subject)
            .await?
            .ok_or(DomainError::InvalidToken)?;

        let now = Utc::now();
        let next = self.codec.new_refresh_record(&record.subject, now);

        match self.store.rotate(&record.token_id, next.clone()).await {
            Ok(()) => {}
            Err(StoreError::AlreadyRevoked { .. }) => {
                return Err(self.contain_reuse(&record).await);
            }
            Err(StoreError::NotFound { .. }) => return Err(DomainError::InvalidToken),
            Err(e) => return Err(DomainError::from_store(e)),
        }

        info!(
            subject = %record.subject,
            old_token_id = %record.token_id,
            new_token_id = %next.token_id,
            "Refresh token rotated"
        );

        mint_pair(&self.codec, &principal, &next, now)
    }

    /// Revoke all sessions of the subject and build the reuse error
    async fn contain_reuse(&self, record: &RefreshRecord) -> DomainError {
        match self.store.revoke_subject(&record.subject).await {
            Ok(revoked) => warn!(
                subject = %record.subject,
                token_id = %record.token_id,
                replaced_by = ?record.replaced_by,
                revoked,
                "Refresh token reuse detected, subject sessions revoked"
            ),
            Err(e) => error!(
                subject = %record.subject,
                token_id = %record.token_id,
                error = %e,
                "Refresh token reuse detected, failed to revoke subject sessions"
            ),
        }

        DomainError::TokenReuseDetected {
            subject: record.subject.clone(),
        }
    }
}
