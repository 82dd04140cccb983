use crate::domain_model::{Claims, RefreshHandle};
use crate::domain_port::*;
use redis::aio::ConnectionManager;
use redis::{
    AsyncCommands, FromRedisValue, RedisError, RedisResult, RedisWrite, ToRedisArgs, Value,
};
use std::time::Duration;
use tracing::info;

/// Credential store on Redis. One string key per handle holding the claims
/// as JSON, expiring through `SET .. EX`.
pub struct RedisCredentialStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisCredentialStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisCredentialStore {
            conn,
            prefix: prefix.into(),
        }
    }

    /// Opens a managed connection and checks it with `PING`.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let conn = client.get_connection_manager().await.map_err(unavailable)?;
        let store = Self::new(conn, prefix);
        store.ping().await?;
        info!(prefix = %store.prefix, "connected to redis credential store");
        Ok(store)
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    fn key(&self, handle: &RefreshHandle) -> String {
        format!("{}:{}", self.prefix, handle)
    }
}

fn unavailable(e: RedisError) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

impl ToRedisArgs for Claims {
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + RedisWrite,
    {
        // string keys and JSON values only, so encoding cannot fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        out.write_arg(&json)
    }
}

impl FromRedisValue for Claims {
    fn from_redis_value(v: &Value) -> RedisResult<Self> {
        let s: String = redis::from_redis_value(v)?;
        let claims = serde_json::from_str::<Claims>(&s).map_err(|e| {
            RedisError::from((
                redis::ErrorKind::TypeError,
                "invalid claims json",
                e.to_string(),
            ))
        })?;
        Ok(claims)
    }
}

#[async_trait::async_trait]
impl CredentialStore for RedisCredentialStore {
    async fn get(&self, handle: &RefreshHandle) -> Result<Claims, StoreError> {
        let key = self.key(handle);
        let mut conn = self.conn.clone();
        let val: Option<Claims> = conn.get(&key).await.map_err(unavailable)?;
        val.ok_or(StoreError::NotFound)
    }

    async fn set(
        &self,
        handle: &RefreshHandle,
        claims: &Claims,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let key = self.key(handle);
        // EX 0 is rejected by redis
        let ttl_secs = ttl.as_secs().max(1);
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, claims, ttl_secs)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn delete(&self, handle: &RefreshHandle) -> Result<u64, StoreError> {
        let key = self.key(handle);
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(&key).await.map_err(unavailable)?;
        Ok(removed)
    }
}
