//! Redis Backend
//!
//! Shared Redis store reached through a `ConnectionManager`, which
//! reconnects on its own. Timeouts are the connection manager's; no
//! retries are added here.

use std::fmt;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::info;

use super::CacheBackend;
use crate::error::BackendError;

/// Redis-backed store.
#[derive(Clone)]
pub struct RedisBackend {
    conn_manager: ConnectionManager,
    redis_url: String,
}

impl fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisBackend")
            .field("redis_url", &self.redis_url)
            .field("conn_manager", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisBackend {
    /// Opens a managed connection to `redis_url`.
    pub async fn connect(redis_url: &str) -> Result<Self, BackendError> {
        let client = redis::Client::open(redis_url)?;
        let conn_manager = ConnectionManager::new(client).await?;
        info!(redis_url, "Redis connection manager initialized");

        Ok(Self {
            conn_manager,
            redis_url: redis_url.to_string(),
        })
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let mut conn = self.conn_manager.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        ttl_secs: u64,
        value: &[u8],
    ) -> Result<(), BackendError> {
        let mut conn = self.conn_manager.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn find_keys_by_pattern(&self, pattern: &str) -> Result<Vec<String>, BackendError> {
        let mut conn = self.conn_manager.clone();
        let keys: Vec<String> = conn.keys(pattern).await?;
        Ok(keys)
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<usize, BackendError> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn_manager.clone();
        let removed: usize = conn.del(keys).await?;
        Ok(removed)
    }
}
