use crate::domain_model::{AccessToken, AlgorithmFamily, Claims, RefreshHandle, TokenPair};
use crate::domain_port::StoreError;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("malformed credential: {0}")]
    MalformedInput(String),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("credential expired")]
    Expired,
    #[error("refresh handle not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("signing error: {0}")]
    SigningError(String),
    /// The presented handle was revoked but no replacement could be issued.
    #[error("refresh handle revoked but no replacement issued: {0}")]
    SessionLost(#[source] Box<TokenError>),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl TokenError {
    /// The caller has to start a new session from scratch.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, TokenError::NotFound | TokenError::SessionLost(_))
    }

    /// Nothing was changed server-side; the same call may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TokenError::StoreUnavailable(_))
    }
}

impl From<StoreError> for TokenError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => TokenError::NotFound,
            StoreError::Unavailable(msg) => TokenError::StoreUnavailable(msg),
            StoreError::InvalidTtl(msg) => TokenError::Config(msg),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TokenServiceConfig {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            access_ttl: Duration::from_secs(5 * 60),
            refresh_ttl: Duration::from_secs(30 * 24 * 60 * 60),
        }
    }
}

/// Upper bound for either lifetime. Keeps `iat + ttl` and `now + ttl` well
/// inside both `i64` seconds and the `chrono` date range.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

impl TokenServiceConfig {
    pub fn validate(&self) -> Result<(), TokenError> {
        check_ttl("access", self.access_ttl)?;
        check_ttl("refresh", self.refresh_ttl)?;
        Ok(())
    }

    /// Access lifetime in whole seconds, as stamped into `exp`.
    pub fn access_ttl_secs(&self) -> Result<i64, TokenError> {
        i64::try_from(self.access_ttl.as_secs())
            .map_err(|_| TokenError::Config("access ttl out of range".to_string()))
    }
}

fn check_ttl(name: &str, ttl: Duration) -> Result<(), TokenError> {
    if ttl.as_secs() == 0 {
        return Err(TokenError::Config(format!(
            "{} ttl must be at least one second",
            name
        )));
    }
    if ttl > MAX_TTL {
        return Err(TokenError::Config(format!(
            "{} ttl must not exceed {} seconds",
            name,
            MAX_TTL.as_secs()
        )));
    }
    Ok(())
}

/// Signature strategy chosen at construction.
///
/// `verify` checks the signature and the algorithm family only. Expiry is the
/// caller's job so it can be evaluated against an injected clock.
pub trait TokenSigner: Send + Sync {
    fn family(&self) -> AlgorithmFamily;
    fn sign(&self, claims: &Claims) -> Result<AccessToken, TokenError>;
    fn verify(&self, token: &AccessToken) -> Result<Claims, TokenError>;
}

#[async_trait::async_trait]
pub trait TokenService: Send + Sync {
    /// Stamps fresh timestamps onto `template`, signs it and stores a new
    /// refresh handle. Nothing is returned unless both halves exist.
    async fn issue(&self, template: Claims) -> Result<TokenPair, TokenError>;

    /// Signature, algorithm family and expiry check. Returns the decoded claims.
    async fn parse_and_verify(&self, token: &AccessToken) -> Result<Claims, TokenError>;

    async fn validate(&self, token: &AccessToken) -> Result<(), TokenError> {
        self.parse_and_verify(token).await.map(|_| ())
    }

    /// Exchanges a refresh handle for a new pair, revoking the old handle.
    async fn rotate(&self, handle: &RefreshHandle) -> Result<TokenPair, TokenError>;

    /// Explicit logout. Returns whether a live record was removed.
    async fn revoke(&self, handle: &RefreshHandle) -> Result<bool, TokenError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reauthentication_and_retry_are_disjoint() {
        let lost = TokenError::SessionLost(Box::new(TokenError::StoreUnavailable("down".into())));
        assert!(lost.requires_reauthentication());
        assert!(!lost.is_retryable());

        let down = TokenError::StoreUnavailable("down".into());
        assert!(down.is_retryable());
        assert!(!down.requires_reauthentication());

        assert!(TokenError::NotFound.requires_reauthentication());
        assert!(!TokenError::Expired.is_retryable());
    }

    #[test]
    fn store_errors_map_onto_token_errors() {
        assert!(matches!(
            TokenError::from(StoreError::NotFound),
            TokenError::NotFound
        ));
        assert!(matches!(
            TokenError::from(StoreError::Unavailable("x".into())),
            TokenError::StoreUnavailable(m) if m == "x"
        ));
        let err = TokenError::from(StoreError::InvalidTtl("too long".into()));
        assert!(matches!(err, TokenError::Config(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn zero_ttls_are_rejected() {
        assert!(TokenServiceConfig::default().validate().is_ok());
        let cfg = TokenServiceConfig {
            access_ttl: Duration::from_millis(500),
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(TokenError::Config(_))));
        let cfg = TokenServiceConfig {
            refresh_ttl: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(TokenError::Config(_))));
    }

    #[test]
    fn oversized_ttls_are_rejected() {
        for secs in [u64::MAX, i64::MAX as u64, MAX_TTL.as_secs() + 1] {
            let cfg = TokenServiceConfig {
                access_ttl: Duration::from_secs(secs),
                ..Default::default()
            };
            assert!(matches!(cfg.validate(), Err(TokenError::Config(_))), "{secs}");
            let cfg = TokenServiceConfig {
                refresh_ttl: Duration::from_secs(secs),
                ..Default::default()
            };
            assert!(matches!(cfg.validate(), Err(TokenError::Config(_))), "{secs}");
        }
        let cfg = TokenServiceConfig {
            access_ttl: MAX_TTL,
            refresh_ttl: MAX_TTL,
        };
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.access_ttl_secs().unwrap(), MAX_TTL.as_secs() as i64);
    }
}
