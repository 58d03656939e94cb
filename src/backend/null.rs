//! Null Backend
//!
//! Stands in for a missing backend so the cache has a single code path.

use async_trait::async_trait;

use super::CacheBackend;
use crate::error::BackendError;

/// Backend that stores nothing: reads miss, writes and deletes succeed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

#[async_trait]
impl CacheBackend for NullBackend {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(None)
    }

    async fn set_with_expiry(
        &self,
        _key: &str,
        _ttl_secs: u64,
        _value: &[u8],
    ) -> Result<(), BackendError> {
        Ok(())
    }

    async fn find_keys_by_pattern(&self, _pattern: &str) -> Result<Vec<String>, BackendError> {
        Ok(Vec::new())
    }

    async fn delete_keys(&self, _keys: &[String]) -> Result<usize, BackendError> {
        Ok(0)
    }

    fn is_available(&self) -> bool {
        false
    }
}
