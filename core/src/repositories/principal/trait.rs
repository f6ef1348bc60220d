//! Principal lookup used to re-derive claims on refresh.

use async_trait::async_trait;

use crate::domain::entities::principal::Principal;
use crate::errors::DomainError;

/// Resolves a token subject to the current principal
///
/// Backed by the user directory of the host application. Roles can change
/// between issue and refresh, so refresh always goes through this lookup
/// instead of trusting anything carried by the refresh token.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// # Returns
    /// * `Ok(Some(Principal))` - Subject is a known user
    /// * `Ok(None)` - Subject no longer exists
    /// * `Err(DomainError)` - Directory lookup failed
    async fn resolve(&self, subject: &str) -> Result<Option<Principal>, DomainError>;
}
