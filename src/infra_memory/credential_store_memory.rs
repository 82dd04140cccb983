use crate::domain_model::{Claims, RefreshHandle};
use crate::domain_port::*;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

struct Entry {
    claims: Claims,
    expires_at: DateTime<Utc>,
}

/// In-process credential store.
///
/// Records live only as long as the process, so handles cannot be shared with
/// another process or survive a restart. Expired records are treated as absent
/// and dropped on the next access to their key, or all at once by
/// `purge_expired` (periodically via `spawn_purge`).
pub struct MemoryCredentialStore {
    entries: DashMap<String, Entry>,
    clock: Arc<dyn Clock>,
}

impl MemoryCredentialStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Number of records held, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, e| e.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    /// Runs `purge_expired` every `every` until the store is dropped.
    pub fn spawn_purge(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                let purged = store.purge_expired();
                if purged > 0 {
                    debug!(purged, remaining = store.len(), "purged expired refresh records");
                }
            }
        })
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, handle: &RefreshHandle) -> Result<Claims, StoreError> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(handle.as_str()) {
            if entry.expires_at > now {
                return Ok(entry.claims.clone());
            }
        }
        self.entries
            .remove_if(handle.as_str(), |_, e| e.expires_at <= now);
        Err(StoreError::NotFound)
    }

    async fn set(
        &self,
        handle: &RefreshHandle,
        claims: &Claims,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl))
            .ok_or_else(|| StoreError::InvalidTtl(format!("{}s is out of range", ttl.as_secs())))?;
        let entry = Entry {
            claims: claims.clone(),
            expires_at,
        };
        self.entries.insert(handle.as_str().to_string(), entry);
        Ok(())
    }

    async fn delete(&self, handle: &RefreshHandle) -> Result<u64, StoreError> {
        let now = self.clock.now();
        let removed = self
            .entries
            .remove(handle.as_str())
            .filter(|(_, e)| e.expires_at > now);
        Ok(removed.map_or(0, |_| 1))
    }
}
