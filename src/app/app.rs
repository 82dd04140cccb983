use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::settings::{Settings, Token};
use anyhow::{Context, anyhow};
use jsonwebtoken::Algorithm;
use std::fs;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Services assembled from settings.
pub struct App {
    pub token_service: Arc<dyn TokenService>,
}

impl App {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let signer = build_signer(&settings.token)?;

        let store: Arc<dyn CredentialStore> = match settings.store.backend.as_str() {
            "memory" => {
                let store = Arc::new(MemoryCredentialStore::new(clock.clone()));
                if settings.store.purge_interval_secs > 0 {
                    store.spawn_purge(Duration::from_secs(settings.store.purge_interval_secs));
                }
                store
            }
            "redis" => {
                let url = settings
                    .store
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| anyhow!("store.redis_url is required for the redis backend"))?;
                Arc::new(RedisCredentialStore::connect(url, settings.store.prefix.clone()).await?)
            }
            other => return Err(anyhow!("Unknown store backend: {}", other)),
        };
        info!(backend = %settings.store.backend, algorithm = %settings.token.algorithm, "token service ready");

        let token_service: Arc<dyn TokenService> = Arc::new(RealTokenService::try_new(
            signer,
            store,
            clock,
            settings.token.service_config(),
        )?);

        Ok(Self { token_service })
    }
}

fn build_signer(token: &Token) -> anyhow::Result<Arc<dyn TokenSigner>> {
    let algorithm = Algorithm::from_str(&token.algorithm)
        .map_err(|e| anyhow!("unknown signing algorithm {:?}: {}", token.algorithm, e))?;

    let signer = match (&token.secret, &token.private_key_path, &token.public_key_path) {
        (Some(secret), None, None) => JwtSigner::hmac(algorithm, secret.as_bytes())?,
        (None, Some(private), Some(public)) => {
            let private_pem =
                fs::read(private).with_context(|| format!("reading private key {}", private))?;
            let public_pem =
                fs::read(public).with_context(|| format!("reading public key {}", public))?;
            JwtSigner::from_pem(algorithm, &private_pem, &public_pem)?
        }
        _ => {
            return Err(anyhow!(
                "token settings need either `secret` or both `private_key_path` and `public_key_path`"
            ));
        }
    };
    Ok(Arc::new(signer))
}
