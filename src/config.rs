//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Which key-value store backs the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Shared Redis instance
    Redis,
    /// In-process TTL store, lost on restart
    Memory,
    /// No backend; every read misses and every write is dropped
    None,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(BackendKind::Redis),
            "memory" => Ok(BackendKind::Memory),
            "none" | "disabled" => Ok(BackendKind::None),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend selection
    pub backend: BackendKind,
    /// Redis connection URL, used when `backend` is `Redis`
    pub redis_url: String,
    /// Default TTL in seconds for cached stats
    pub stats_ttl: u64,
    /// Default TTL in seconds for sync cursors
    pub cursor_ttl: u64,
    /// Namespace prefix for stats keys
    pub stats_key_prefix: String,
    /// Namespace prefix for cursor keys
    pub cursor_key_prefix: String,
    /// HTTP server port
    pub server_port: u16,
    /// Memory backend sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - `redis`, `memory` or `none` (default: memory)
    /// - `REDIS_URL` - Redis URL (default: redis://127.0.0.1:6379)
    /// - `STATS_TTL` - Stats TTL in seconds (default: 120, also used for 0)
    /// - `CURSOR_TTL` - Cursor TTL in seconds (default: 600, also used for 0)
    /// - `STATS_KEY_PREFIX` - (default: mailstats:stats:)
    /// - `CURSOR_KEY_PREFIX` - (default: mailstats:cursor:)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: parse_env("CACHE_BACKEND").unwrap_or(defaults.backend),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            stats_ttl: parse_ttl_env("STATS_TTL").unwrap_or(defaults.stats_ttl),
            cursor_ttl: parse_ttl_env("CURSOR_TTL").unwrap_or(defaults.cursor_ttl),
            stats_key_prefix: env::var("STATS_KEY_PREFIX").unwrap_or(defaults.stats_key_prefix),
            cursor_key_prefix: env::var("CURSOR_KEY_PREFIX")
                .unwrap_or(defaults.cursor_key_prefix),
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_env("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Parses a TTL in seconds, treating 0 like an unparseable value.
fn parse_ttl_env(name: &str) -> Option<u64> {
    parse_env(name).filter(|ttl: &u64| *ttl > 0)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            stats_ttl: 120,
            cursor_ttl: 600,
            stats_key_prefix: "mailstats:stats:".to_string(),
            cursor_key_prefix: "mailstats:cursor:".to_string(),
            server_port: 3000,
            cleanup_interval: 1,
        }
    }
}
