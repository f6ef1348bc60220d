//! Behaviour every persistent token store must share

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;
use wc_core::domain::RefreshRecord;
use wc_core::errors::StoreError;
use wc_core::repositories::TokenStore;

pub fn unique_subject() -> String {
    format!("it-{}", Uuid::new_v4())
}

pub fn fresh_record(subject: &str) -> RefreshRecord {
    let now = Utc::now();
    RefreshRecord::new(
        Uuid::new_v4().to_string(),
        subject,
        now,
        now + Duration::days(30),
    )
}

pub async fn record_and_lookup<S: TokenStore>(store: &S) {
    let subject = unique_subject();
    let record = fresh_record(&subject);

    store.record(record.clone()).await.unwrap();
    let found = store.lookup(&record.token_id).await.unwrap();

    assert_eq!(found.token_id, record.token_id);
    assert_eq!(found.subject, subject);
    assert!(!found.revoked);
    assert!(found.replaced_by.is_none());

    let duplicate = store.record(record.clone()).await;
    assert!(matches!(duplicate, Err(StoreError::DuplicateId { .. })));

    let missing = store.lookup(&Uuid::new_v4().to_string()).await;
    assert!(matches!(missing, Err(StoreError::NotFound { .. })));
}

pub async fn rotate_links_records<S: TokenStore>(store: &S) {
    let subject = unique_subject();
    let old = fresh_record(&subject);
    let new = fresh_record(&subject);
    store.record(old.clone()).await.unwrap();

    store.rotate(&old.token_id, new.clone()).await.unwrap();

    let old_after = store.lookup(&old.token_id).await.unwrap();
    assert!(old_after.revoked);
    assert_eq!(old_after.replaced_by.as_deref(), Some(new.token_id.as_str()));
    assert!(!store.lookup(&new.token_id).await.unwrap().revoked);

    let again = store.rotate(&old.token_id, fresh_record(&subject)).await;
    assert!(matches!(again, Err(StoreError::AlreadyRevoked { .. })));

    let active = store.active_for_subject(&subject).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].token_id, new.token_id);
}

pub async fn rotate_rejects_duplicate_without_side_effects<S: TokenStore>(store: &S) {
    let subject = unique_subject();
    let old = fresh_record(&subject);
    let taken = fresh_record(&subject);
    store.record(old.clone()).await.unwrap();
    store.record(taken.clone()).await.unwrap();

    let result = store.rotate(&old.token_id, taken.clone()).await;
    assert!(matches!(result, Err(StoreError::DuplicateId { .. })));

    // The old record must still be usable
    assert!(!store.lookup(&old.token_id).await.unwrap().revoked);
}

pub async fn concurrent_rotation_has_one_winner<S: TokenStore + 'static>(store: Arc<S>) {
    let subject = unique_subject();
    let old = fresh_record(&subject);
    store.record(old.clone()).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        let old_id = old.token_id.clone();
        let new = fresh_record(&subject);
        handles.push(tokio::spawn(async move { store.rotate(&old_id, new).await }));
    }

    let mut wins = 0;
    let mut already_revoked = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => wins += 1,
            Err(StoreError::AlreadyRevoked { .. }) => already_revoked += 1,
            Err(other) => panic!("unexpected rotation error: {}", other),
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(already_revoked, 7);
    assert_eq!(store.count_active(&subject).await.unwrap(), 1);
}

pub async fn revoke_subject_and_sweep<S: TokenStore>(store: &S) {
    let subject = unique_subject();
    for _ in 0..3 {
        store.record(fresh_record(&subject)).await.unwrap();
    }

    assert_eq!(store.revoke_subject(&subject).await.unwrap(), 3);
    assert_eq!(store.revoke_subject(&subject).await.unwrap(), 0);
    assert!(store.active_for_subject(&subject).await.unwrap().is_empty());

    let short = {
        let now = Utc::now();
        RefreshRecord::new(
            Uuid::new_v4().to_string(),
            &subject,
            now,
            now + Duration::seconds(60),
        )
    };
    store.record(short.clone()).await.unwrap();

    let removed = store
        .sweep_expired(Utc::now() + Duration::seconds(120))
        .await
        .unwrap();
    assert!(removed >= 1);
    assert!(matches!(
        store.lookup(&short.token_id).await,
        Err(StoreError::NotFound { .. })
    ));
}
