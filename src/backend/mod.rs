//! Backend Module
//!
//! The key-value store contract the cache is built on, plus its
//! implementations: Redis, an in-process TTL store, and a null object used
//! when no backend is configured.

mod entry;
mod memory;
mod null;
pub mod pattern;
mod redis;

use std::fmt;

use async_trait::async_trait;

use crate::error::BackendError;

pub use entry::{CacheEntry, Clock, ManualClock, SystemClock};
pub use memory::MemoryBackend;
pub use null::NullBackend;
pub use self::redis::RedisBackend;

// == Public Constants ==
/// Maximum key length accepted by the memory backend, in bytes
pub const MAX_KEY_LENGTH: usize = 512;

/// Maximum value size accepted by the memory backend, in bytes
pub const MAX_VALUE_SIZE: usize = 64 * 1024;

// == Backend Contract ==
/// Minimal key-value capability the cache needs from its store.
///
/// Implementations report failures through `BackendError`; callers are
/// expected to catch them at the call site.
#[async_trait]
pub trait CacheBackend: Send + Sync + fmt::Debug {
    /// Returns the raw bytes stored under `key`, or `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Stores `value` under `key`, expiring after `ttl_secs` seconds.
    async fn set_with_expiry(
        &self,
        key: &str,
        ttl_secs: u64,
        value: &[u8],
    ) -> Result<(), BackendError>;

    /// Returns every live key matching a Redis-style glob pattern.
    async fn find_keys_by_pattern(&self, pattern: &str) -> Result<Vec<String>, BackendError>;

    /// Deletes the given keys, returning how many existed.
    async fn delete_keys(&self, keys: &[String]) -> Result<usize, BackendError>;

    /// `false` only for the null object standing in for a missing backend.
    fn is_available(&self) -> bool {
        true
    }
}
