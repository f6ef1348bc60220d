//! End-to-end session lifecycle over the in-memory backends

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wc_core::{
        DomainError, InMemoryPrincipalDirectory, InMemoryTokenStore, Principal, SessionService,
        TokenServiceConfig, TokenStore, UserRole,
    };
    use wc_shared::config::{AppConfig, Environment};

    async fn service_from_app_config() -> (
        SessionService<InMemoryTokenStore, InMemoryPrincipalDirectory>,
        Arc<InMemoryTokenStore>,
        Arc<InMemoryPrincipalDirectory>,
    ) {
        let app = AppConfig::for_environment(Environment::Development);
        let config = TokenServiceConfig::from_jwt_config(&app.auth.jwt).unwrap();

        let store = Arc::new(InMemoryTokenStore::new());
        let directory = Arc::new(InMemoryPrincipalDirectory::new());
        let service =
            SessionService::from_config(Arc::clone(&store), Arc::clone(&directory), &config)
                .unwrap();

        (service, store, directory)
    }

    #[tokio::test]
    async fn test_login_refresh_logout_flow() {
        let (service, store, directory) = service_from_app_config().await;
        let principal = Principal::new("42", UserRole::FreeUser)
            .with_email("kim@example.com")
            .with_name("Kim");
        directory.upsert(principal.clone()).await;

        let login = service.login(&principal).await.unwrap();
        let me = service.current_user(&login.access_token).await.unwrap();
        assert_eq!(me.email, "kim@example.com");

        let refreshed = service.refresh(&login.refresh_token).await.unwrap();
        assert_ne!(refreshed.refresh_token, login.refresh_token);

        service.logout(&refreshed.refresh_token).await.unwrap();
        assert_eq!(store.count_active("42").await.unwrap(), 0);

        // Access tokens are stateless and stay valid until they expire
        assert!(service.verify_access_token(&refreshed.access_token).is_ok());
    }

    #[tokio::test]
    async fn test_stolen_token_replay_locks_out_both_parties() {
        let (service, _store, directory) = service_from_app_config().await;
        let principal = Principal::new("u1", UserRole::Admin);
        directory.upsert(principal.clone()).await;

        let original = service.issue(&principal).await.unwrap();

        // Attacker refreshes first with a copied token
        let attacker = service.refresh(&original.refresh_token).await.unwrap();

        // Legitimate client replays the same token
        let victim = service.refresh(&original.refresh_token).await;
        assert!(matches!(victim, Err(DomainError::TokenReuseDetected { .. })));

        // The attacker's rotated token was revoked by containment
        let attacker_next = service.refresh(&attacker.refresh_token).await;
        assert!(matches!(attacker_next, Err(DomainError::TokenReuseDetected { .. })));
    }
}
