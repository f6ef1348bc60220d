//! Integration tests for the Redis token store
//!
//! These tests require a running Redis instance.
//! Run with: cargo test -p wc_infra --test redis_token_store_integration -- --ignored

mod common;

use std::sync::Arc;

use uuid::Uuid;
use wc_infra::cache::{RedisClient, RedisTokenStore};
use wc_shared::config::CacheConfig;

async fn store() -> RedisTokenStore {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let config = CacheConfig::new(url).with_prefix(format!("wc-test-{}", Uuid::new_v4()));

    let client = RedisClient::new(config).await.unwrap();
    RedisTokenStore::new(client)
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_record_and_lookup() {
    common::record_and_lookup(&store().await).await;
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_rotate_links_records() {
    common::rotate_links_records(&store().await).await;
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_rotate_duplicate_id() {
    common::rotate_rejects_duplicate_without_side_effects(&store().await).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore] // Requires Redis server
async fn test_concurrent_rotation() {
    common::concurrent_rotation_has_one_winner(Arc::new(store().await)).await;
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_revoke_subject_and_sweep() {
    common::revoke_subject_and_sweep(&store().await).await;
}
