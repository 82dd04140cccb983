#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::Algorithm;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use utoken::application_impl::{JwtSigner, RealTokenService};
use utoken::application_port::{TokenError, TokenServiceConfig, TokenSigner};
use utoken::domain_model::{AccessToken, AlgorithmFamily, Claims, RefreshHandle};
use utoken::domain_port::{CredentialStore, ManualClock, StoreError};
use utoken::infra_memory::MemoryCredentialStore;

pub const KEY: &[u8] = b"shannon";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 3, 5, 0, 0, 0).unwrap()
}

/// Memory store that counts calls and can be told to fail.
pub struct RecordingStore {
    inner: MemoryCredentialStore,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    pub deletes: AtomicUsize,
    pub fail_gets: AtomicBool,
    pub fail_sets: AtomicBool,
}

impl RecordingStore {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            inner: MemoryCredentialStore::new(clock),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            fail_gets: AtomicBool::new(false),
            fail_sets: AtomicBool::new(false),
        }
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CredentialStore for RecordingStore {
    async fn get(&self, handle: &RefreshHandle) -> Result<Claims, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        self.inner.get(handle).await
    }

    async fn set(
        &self,
        handle: &RefreshHandle,
        claims: &Claims,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(handle, claims, ttl).await
    }

    async fn delete(&self, handle: &RefreshHandle) -> Result<u64, StoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(handle).await
    }
}

/// HMAC signer whose `sign` can be told to fail.
pub struct FailingSigner {
    inner: JwtSigner,
    pub fail_sign: AtomicBool,
}

impl FailingSigner {
    pub fn new(alg: Algorithm, key: &[u8]) -> Self {
        Self {
            inner: JwtSigner::hmac(alg, key).unwrap(),
            fail_sign: AtomicBool::new(false),
        }
    }
}

impl TokenSigner for FailingSigner {
    fn family(&self) -> AlgorithmFamily {
        self.inner.family()
    }

    fn sign(&self, claims: &Claims) -> Result<AccessToken, TokenError> {
        if self.fail_sign.load(Ordering::SeqCst) {
            return Err(TokenError::SigningError("key unavailable".to_string()));
        }
        self.inner.sign(claims)
    }

    fn verify(&self, token: &AccessToken) -> Result<Claims, TokenError> {
        self.inner.verify(token)
    }
}

pub struct Fixture {
    pub clock: Arc<ManualClock>,
    pub store: Arc<RecordingStore>,
    pub service: Arc<RealTokenService>,
}

pub fn fixture() -> Fixture {
    fixture_with(Algorithm::HS256, KEY, TokenServiceConfig::default())
}

pub fn fixture_with(alg: Algorithm, key: &[u8], cfg: TokenServiceConfig) -> Fixture {
    fixture_with_signer(Arc::new(JwtSigner::hmac(alg, key).unwrap()), cfg)
}

pub fn fixture_with_signer(signer: Arc<dyn TokenSigner>, cfg: TokenServiceConfig) -> Fixture {
    let clock = Arc::new(ManualClock::new(t0()));
    let store = Arc::new(RecordingStore::new(clock.clone()));
    let service =
        Arc::new(RealTokenService::try_new(signer, store.clone(), clock.clone(), cfg).unwrap());
    Fixture {
        clock,
        store,
        service,
    }
}
