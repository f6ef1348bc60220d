//! In-memory principal directory

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::principal::Principal;
use crate::errors::DomainError;

use super::r#trait::PrincipalResolver;

/// Principal directory held in process memory
#[derive(Clone, Default)]
pub struct InMemoryPrincipalDirectory {
    principals: Arc<RwLock<HashMap<String, Principal>>>,
}

impl InMemoryPrincipalDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a principal
    pub async fn upsert(&self, principal: Principal) {
        self.principals
            .write()
            .await
            .insert(principal.id.clone(), principal);
    }

    /// Remove a principal, returning it if present
    pub async fn remove(&self, id: &str) -> Option<Principal> {
        self.principals.write().await.remove(id)
    }
}

#[async_trait]
impl PrincipalResolver for InMemoryPrincipalDirectory {
    async fn resolve(&self, subject: &str) -> Result<Option<Principal>, DomainError> {
        Ok(self.principals.read().await.get(subject).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::principal::UserRole;

    #[tokio::test]
    async fn test_upsert_resolve_remove() {
        let directory = InMemoryPrincipalDirectory::new();
        directory.upsert(Principal::new("u1", UserRole::FreeUser)).await;
        directory.upsert(Principal::new("u1", UserRole::Admin)).await;

        let resolved = directory.resolve("u1").await.unwrap().unwrap();
        assert_eq!(resolved.role, UserRole::Admin);

        assert!(directory.remove("u1").await.is_some());
        assert!(directory.resolve("u1").await.unwrap().is_none());
    }
}
