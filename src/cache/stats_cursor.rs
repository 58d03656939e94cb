//! Stats/Cursor Cache
//!
//! Best-effort TTL cache for per-user stats and per-source sync cursors.
//!
//! Every operation is total: reads return `None` on any failure, writes and
//! invalidations return `()`. Backend errors, malformed stored values and
//! invalid key components are logged at warn level and otherwise swallowed,
//! so the cache can never be the reason a request fails.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::keys::{KeyBuilder, VipFingerprint};
use super::values::{CachedStats, StatsCounts, SyncCursor};
use super::{DEFAULT_CURSOR_TTL, DEFAULT_STATS_TTL};
use crate::backend::{CacheBackend, NullBackend};
use crate::config::Config;
use crate::error::KeyError;

// == Stats Cursor Cache ==
/// Mediates all cache reads and writes over a single backend handle.
#[derive(Debug, Clone)]
pub struct StatsCursorCache {
    backend: Arc<dyn CacheBackend>,
    keys: KeyBuilder,
    stats_ttl: Duration,
    cursor_ttl: Duration,
}

impl StatsCursorCache {
    // == Constructor ==
    /// Creates a cache with default key prefixes and TTLs.
    ///
    /// A `None` backend puts the cache in permanent no-op mode.
    pub fn new(backend: Option<Arc<dyn CacheBackend>>) -> Self {
        Self::with_options(
            backend,
            KeyBuilder::default(),
            DEFAULT_STATS_TTL,
            DEFAULT_CURSOR_TTL,
        )
    }

    pub fn with_options(
        backend: Option<Arc<dyn CacheBackend>>,
        keys: KeyBuilder,
        stats_ttl: Duration,
        cursor_ttl: Duration,
    ) -> Self {
        let backend = backend.unwrap_or_else(|| Arc::new(NullBackend));
        Self {
            backend,
            keys,
            stats_ttl,
            cursor_ttl,
        }
    }

    /// Creates a cache using the prefixes and TTLs from `config`.
    pub fn from_config(
        backend: Option<Arc<dyn CacheBackend>>,
        config: &Config,
    ) -> Result<Self, KeyError> {
        let keys = KeyBuilder::new(
            config.stats_key_prefix.clone(),
            config.cursor_key_prefix.clone(),
        )?;
        Ok(Self::with_options(
            backend,
            keys,
            Duration::from_secs(config.stats_ttl),
            Duration::from_secs(config.cursor_ttl),
        ))
    }

    /// Whether a real backend is behind this cache.
    pub fn is_enabled(&self) -> bool {
        self.backend.is_available()
    }

    pub fn keys(&self) -> &KeyBuilder {
        &self.keys
    }

    pub fn stats_ttl(&self) -> Duration {
        self.stats_ttl
    }

    pub fn cursor_ttl(&self) -> Duration {
        self.cursor_ttl
    }

    // == Stats ==
    /// Returns cached stats for (user, VIP set), or `None` on miss.
    pub async fn get_stats(&self, user_id: &str, vips: &VipFingerprint) -> Option<CachedStats> {
        self.read(self.keys.stats_key(user_id, vips), user_id).await
    }

    /// Caches `counts` for (user, VIP set), stamped with the current time.
    ///
    /// `ttl` defaults to the configured stats TTL.
    pub async fn set_stats(
        &self,
        user_id: &str,
        vips: &VipFingerprint,
        counts: StatsCounts,
        ttl: Option<Duration>,
    ) {
        let stats = CachedStats::new(counts, Utc::now());
        let ttl = ttl.unwrap_or(self.stats_ttl);
        self.write(self.keys.stats_key(user_id, vips), user_id, &stats, ttl)
            .await;
    }

    // == Sync Cursors ==
    /// Returns the last cursor for (user, source), or `None` on miss.
    pub async fn get_sync_cursor(&self, user_id: &str, source: &str) -> Option<SyncCursor> {
        self.read(self.keys.cursor_key(user_id, source), user_id)
            .await
    }

    /// Caches `cursor` as-is for (user, source).
    ///
    /// `ttl` defaults to the configured cursor TTL.
    pub async fn set_sync_cursor(
        &self,
        user_id: &str,
        source: &str,
        cursor: &SyncCursor,
        ttl: Option<Duration>,
    ) {
        let ttl = ttl.unwrap_or(self.cursor_ttl);
        self.write(self.keys.cursor_key(user_id, source), user_id, cursor, ttl)
            .await;
    }

    // == Invalidation ==
    /// Drops every stats and cursor entry of `user_id`.
    pub async fn invalidate_user(&self, user_id: &str) {
        let removed = self
            .delete_matching(self.keys.user_stats_pattern(user_id), user_id)
            .await
            + self
                .delete_matching(self.keys.user_cursor_pattern(user_id), user_id)
                .await;

        if removed > 0 {
            info!(user_id, removed, "Invalidated user cache");
        }
    }

    /// Drops every stats entry of `user_id`, keeping its cursors.
    pub async fn invalidate_stats(&self, user_id: &str) {
        let removed = self
            .delete_matching(self.keys.user_stats_pattern(user_id), user_id)
            .await;

        if removed > 0 {
            info!(user_id, removed, "Invalidated stats cache");
        }
    }

    // == Internals ==
    async fn read<T: DeserializeOwned>(
        &self,
        key: Result<String, KeyError>,
        user_id: &str,
    ) -> Option<T> {
        let key = match key {
            Ok(key) => key,
            Err(error) => {
                warn!(user_id, %error, "Cache read skipped: invalid key");
                return None;
            }
        };

        let bytes = match self.backend.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                return None;
            }
            Err(error) => {
                warn!(user_id, key = %key, %error, "Cache read failed");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                debug!(key = %key, "Cache hit");
                Some(value)
            }
            Err(error) => {
                warn!(user_id, key = %key, %error, "Discarding malformed cache value");
                None
            }
        }
    }

    async fn write<T: Serialize>(
        &self,
        key: Result<String, KeyError>,
        user_id: &str,
        value: &T,
        ttl: Duration,
    ) {
        let key = match key {
            Ok(key) => key,
            Err(error) => {
                warn!(user_id, %error, "Cache write skipped: invalid key");
                return;
            }
        };

        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(user_id, key = %key, %error, "Cache write skipped: serialization failed");
                return;
            }
        };

        if let Err(error) = self
            .backend
            .set_with_expiry(&key, ttl_secs(ttl), &bytes)
            .await
        {
            warn!(user_id, key = %key, %error, "Cache write failed");
        }
    }

    /// Deletes every key matching `pattern`, returning how many were removed.
    async fn delete_matching(&self, pattern: Result<String, KeyError>, user_id: &str) -> usize {
        let pattern = match pattern {
            Ok(pattern) => pattern,
            Err(error) => {
                warn!(user_id, %error, "Cache invalidation skipped: invalid key");
                return 0;
            }
        };

        let keys = match self.backend.find_keys_by_pattern(&pattern).await {
            Ok(keys) => keys,
            Err(error) => {
                warn!(user_id, %pattern, %error, "Cache key lookup failed");
                return 0;
            }
        };

        if keys.is_empty() {
            return 0;
        }

        match self.backend.delete_keys(&keys).await {
            Ok(removed) => removed,
            Err(error) => {
                warn!(user_id, %pattern, %error, "Cache key deletion failed");
                0
            }
        }
    }
}

/// Whole seconds, rounding any fractional part up.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0)
}
