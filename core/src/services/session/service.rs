//! Session facade combining issuance, refresh and revocation

use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::entities::principal::Principal;
use crate::domain::entities::token::{TokenClaims, TokenKind, TokenPair};
use crate::domain::value_objects::{AuthResponse, UserProfile};
use crate::errors::{DomainError, DomainResult, StoreError};
use crate::repositories::{PrincipalResolver, TokenStore};
use crate::services::token::{SweeperConfig, TokenCodec, TokenServiceConfig, TokenSweeper};

use super::issuer::SessionIssuer;
use super::refresher::SessionRefresher;

/// Entry point used by the request handling layer
pub struct SessionService<S: TokenStore + 'static, P: PrincipalResolver> {
    store: Arc<S>,
    principals: Arc<P>,
    codec: Arc<TokenCodec>,
    issuer: SessionIssuer<S>,
    refresher: SessionRefresher<S, P>,
}

impl<S: TokenStore + 'static, P: PrincipalResolver> SessionService<S, P> {
    /// Creates a new session service
    ///
    /// # Arguments
    ///
    /// * `store` - Refresh record store, shared with the sweeper
    /// * `principals` - Directory used to re-derive roles on refresh
    /// * `codec` - Token codec holding the signing keys
    pub fn new(store: Arc<S>, principals: Arc<P>, codec: Arc<TokenCodec>) -> Self {
        Self {
            issuer: SessionIssuer::new(Arc::clone(&store), Arc::clone(&codec)),
            refresher: SessionRefresher::new(
                Arc::clone(&store),
                Arc::clone(&principals),
                Arc::clone(&codec),
            ),
            store,
            principals,
            codec,
        }
    }

    /// Creates a session service, loading signing keys from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(SessionService)` - Keys loaded
    /// * `Err(DomainError::Token)` - Key material missing or invalid
    pub fn from_config(
        store: Arc<S>,
        principals: Arc<P>,
        config: &TokenServiceConfig,
    ) -> DomainResult<Self> {
        let codec = TokenCodec::from_config(config)?;
        Ok(Self::new(store, principals, Arc::new(codec)))
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub async fn issue(&self, principal: &Principal) -> DomainResult<TokenPair> {
        self.issuer.issue(principal).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        self.refresher.refresh(refresh_token).await
    }

    /// Issue a session and wrap it with the user's profile
    pub async fn login(&self, principal: &Principal) -> DomainResult<AuthResponse> {
        let pair = self.issuer.issue(principal).await?;
        Ok(AuthResponse::from_token_pair(
            pair,
            Some(UserProfile::from(principal)),
        ))
    }

    /// Stateless access token check; codec failures keep their cause
    pub fn verify_access_token(&self, access_token: &str) -> DomainResult<TokenClaims> {
        Ok(self.codec.decode_kind(access_token, TokenKind::Access)?)
    }

    /// Profile of the user an access token belongs to
    pub async fn current_user(&self, access_token: &str) -> DomainResult<UserProfile> {
        let claims = self
            .verify_access_token(access_token)
            .map_err(|_| DomainError::InvalidToken)?;

        let principal = self
            .principals
            .resolve(&claims.sub)
            .await?
            .ok_or(DomainError::InvalidToken)?;

        Ok(UserProfile::from(&principal))
    }

    /// Revoke the session a refresh token belongs to
    ///
    /// Logging out twice, or after the record was swept, succeeds.
    pub async fn logout(&self, refresh_token: &str) -> DomainResult<()> {
        let claims = self
            .codec
            .decode_kind(refresh_token, TokenKind::Refresh)
            .map_err(|_| DomainError::InvalidToken)?;

        match self.store.revoke(&claims.jti).await {
            Ok(()) => {
                info!(subject = %claims.sub, token_id = %claims.jti, "Session logged out");
                Ok(())
            }
            Err(StoreError::NotFound { .. }) => {
                debug!(token_id = %claims.jti, "Logout for unknown refresh record");
                Ok(())
            }
            Err(e) => Err(DomainError::from_store(e)),
        }
    }

    /// Revoke every active session of a subject
    pub async fn revoke_all_sessions(&self, subject: &str) -> DomainResult<usize> {
        let revoked = self
            .store
            .revoke_subject(subject)
            .await
            .map_err(DomainError::from_store)?;

        info!(subject, revoked, "All sessions revoked");
        Ok(revoked)
    }

    /// Sweeper sharing this service's store
    pub fn sweeper(&self, config: SweeperConfig) -> TokenSweeper<S> {
        TokenSweeper::new(Arc::clone(&self.store), config)
    }
}
