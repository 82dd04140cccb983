use crate::domain_model::{Claims, RefreshHandle};
use std::time::Duration;

/// Refresh handle -> claims, with per-record absolute expiry.
///
/// Lookups are by handle only. There is deliberately no scan or query.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with `NotFound` when the handle is absent or its TTL has elapsed.
    async fn get(&self, handle: &RefreshHandle) -> Result<Claims, StoreError>;

    /// Creates or overwrites the record. The write is all-or-nothing.
    async fn set(
        &self,
        handle: &RefreshHandle,
        claims: &Claims,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Returns the number of records removed (0 or 1).
    async fn delete(&self, handle: &RefreshHandle) -> Result<u64, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("refresh handle not found or expired")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The record lifetime cannot be represented by the backend.
    #[error("invalid ttl: {0}")]
    InvalidTtl(String),
}
