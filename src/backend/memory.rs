//! Memory Backend
//!
//! In-process key-value store with TTL expiration, used for single-instance
//! deployments and tests. Expired entries are dropped lazily on access and
//! periodically by the cleanup task.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::pattern::compile_pattern;
use super::{CacheBackend, CacheEntry, Clock, SystemClock, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::BackendError;

// == Memory Backend ==
/// TTL-bounded in-memory store. Clones share the same storage.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    /// Key-value storage
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    /// Time source for expiry decisions
    clock: Arc<dyn Clock>,
}

impl MemoryBackend {
    // == Constructor ==
    /// Creates an empty store driven by the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store driven by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let now = self.clock.now_ms();
        let mut entries = self.entries.write().await;

        let expired = match entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => return Ok(None),
        };

        if expired {
            entries.remove(key);
            return Ok(None);
        }

        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        ttl_secs: u64,
        value: &[u8],
    ) -> Result<(), BackendError> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(BackendError::Rejected(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        if value.len() > MAX_VALUE_SIZE {
            return Err(BackendError::Rejected(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        // Same as Redis SET EX 0
        if ttl_secs == 0 {
            return Err(BackendError::Rejected(
                "Expire time must be positive".to_string(),
            ));
        }

        let entry = CacheEntry::new(value.to_vec(), ttl_secs, self.clock.now_ms());
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn find_keys_by_pattern(&self, pattern: &str) -> Result<Vec<String>, BackendError> {
        let matcher = compile_pattern(pattern)?;
        let now = self.clock.now_ms();
        let entries = self.entries.read().await;

        Ok(entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired(now) && matcher.is_match(key.as_str()))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn delete_keys(&self, keys: &[String]) -> Result<usize, BackendError> {
        let now = self.clock.now_ms();
        let mut entries = self.entries.write().await;

        Ok(keys
            .iter()
            .filter_map(|key| entries.remove(key))
            .filter(|entry| !entry.is_expired(now))
            .count())
    }
}
