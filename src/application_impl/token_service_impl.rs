use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Issues, verifies and rotates token pairs.
///
/// Holds no mutable state of its own. The store is the only shared resource and
/// rotation relies on its per-key atomicity only.
pub struct RealTokenService {
    signer: Arc<dyn TokenSigner>,
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    cfg: TokenServiceConfig,
}

impl RealTokenService {
    pub fn try_new(
        signer: Arc<dyn TokenSigner>,
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
        cfg: TokenServiceConfig,
    ) -> Result<Self, TokenError> {
        cfg.validate()?;
        Ok(Self {
            signer,
            store,
            clock,
            cfg,
        })
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.cfg
    }

    fn stamp(&self, claims: &Claims, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        Ok(claims.stamped(now, self.cfg.access_ttl_secs()?))
    }

    /// Signs already-stamped claims and binds them to a fresh handle.
    async fn issue_stamped(&self, claims: Claims) -> Result<TokenPair, TokenError> {
        let access = self.signer.sign(&claims)?;
        let refresh = RefreshHandle::generate();
        self.store
            .set(&refresh, &claims, self.cfg.refresh_ttl)
            .await?;
        Ok(TokenPair {
            access,
            refresh,
            claims,
        })
    }
}

#[async_trait::async_trait]
impl TokenService for RealTokenService {
    async fn issue(&self, template: Claims) -> Result<TokenPair, TokenError> {
        let claims = self.stamp(&template, self.clock.now())?;
        let pair = self.issue_stamped(claims).await?;
        debug!(sub = ?pair.claims.sub, exp = pair.claims.exp, "issued token pair");
        Ok(pair)
    }

    async fn parse_and_verify(&self, token: &AccessToken) -> Result<Claims, TokenError> {
        let claims = self.signer.verify(token).inspect_err(|e| {
            debug!(error = %e, "access credential rejected");
        })?;
        if claims.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    async fn rotate(&self, handle: &RefreshHandle) -> Result<TokenPair, TokenError> {
        let stored = self.store.get(handle).await?;
        let claims = self.stamp(&stored, self.clock.now())?;

        // Revoke before the replacement exists: a lost session is preferred
        // over two live handles for one presented handle.
        let removed = self.store.delete(handle).await?;
        if removed == 0 {
            warn!(sub = ?claims.sub, "refresh handle consumed concurrently, rejecting rotation");
            return Err(TokenError::NotFound);
        }

        match self.issue_stamped(claims).await {
            Ok(pair) => {
                debug!(sub = ?pair.claims.sub, exp = pair.claims.exp, "rotated token pair");
                Ok(pair)
            }
            Err(e) => {
                error!(error = %e, "refresh handle revoked but replacement failed");
                Err(TokenError::SessionLost(Box::new(e)))
            }
        }
    }

    async fn revoke(&self, handle: &RefreshHandle) -> Result<bool, TokenError> {
        let removed = self.store.delete(handle).await?;
        debug!(removed, "refresh handle revoked");
        Ok(removed > 0)
    }
}
