#![cfg(feature = "redis-tests")]

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use utoken::application_impl::{JwtSigner, RealTokenService};
use utoken::application_port::{TokenError, TokenService, TokenServiceConfig};
use utoken::domain_model::{Claims, RefreshHandle};
use utoken::domain_port::{CredentialStore, StoreError, SystemClock};
use utoken::infra_redis::RedisCredentialStore;

fn redis_url() -> String {
    std::env::var("UTOKEN_TEST_REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

/// Each test gets its own key prefix so runs never collide.
async fn new_store() -> RedisCredentialStore {
    let prefix = format!("utoken-test:{}", nanoid::nanoid!(8));
    RedisCredentialStore::connect(&redis_url(), prefix)
        .await
        .expect("redis must be reachable for redis-tests")
}

fn claims() -> Claims {
    Claims::new()
        .with_subject("alice")
        .with_audience("svcA")
        .with_field("tenant", 7)
}

#[tokio::test]
async fn set_then_get_round_trips() {
    let store = new_store().await;
    let h = RefreshHandle::generate();
    store
        .set(&h, &claims(), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(store.get(&h).await.unwrap(), claims());
}

#[tokio::test]
async fn missing_key_is_not_found() {
    let store = new_store().await;
    let res = store.get(&RefreshHandle::generate()).await;
    assert!(matches!(res, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn delete_reports_count() {
    let store = new_store().await;
    let h = RefreshHandle::generate();
    store
        .set(&h, &claims(), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(store.delete(&h).await.unwrap(), 1);
    assert_eq!(store.delete(&h).await.unwrap(), 0);
}

#[tokio::test]
async fn ttl_is_enforced_by_redis() {
    let store = new_store().await;
    let h = RefreshHandle::generate();
    store
        .set(&h, &claims(), Duration::from_secs(1))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert!(matches!(store.get(&h).await, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn rotation_against_redis() {
    let store = Arc::new(new_store().await);
    let service = RealTokenService::try_new(
        Arc::new(JwtSigner::hmac(Algorithm::HS256, b"shannon").unwrap()),
        store.clone(),
        Arc::new(SystemClock),
        TokenServiceConfig::default(),
    )
    .unwrap();

    let first = service.issue(claims()).await.unwrap();
    let second = service.rotate(&first.refresh).await.unwrap();
    assert!(matches!(
        service.rotate(&first.refresh).await,
        Err(TokenError::NotFound)
    ));
    assert_eq!(store.get(&second.refresh).await.unwrap(), second.claims);
}

#[tokio::test]
async fn unreachable_redis_fails_at_connect() {
    let res = RedisCredentialStore::connect("redis://127.0.0.1:1", "utoken-test").await;
    assert!(matches!(res, Err(StoreError::Unavailable(_))));
}
