//! Cache Entry Module
//!
//! Stored values of the memory backend and the clock that decides when they
//! expire.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Clock ==
/// Source of the current time, in Unix milliseconds.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now_ms(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    /// Starts the clock at the current wall-clock time.
    pub fn new() -> Self {
        Self::starting_at(SystemClock.now_ms())
    }

    pub fn starting_at(now_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(now_ms)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

// == Cache Entry ==
/// A single stored value with its expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored bytes
    pub value: Vec<u8>,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry written at `now_ms` that lives for `ttl_secs`.
    pub fn new(value: Vec<u8>, ttl_secs: u64, now_ms: u64) -> Self {
        Self {
            value,
            expires_at: now_ms.saturating_add(ttl_secs.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now_ms` reaches its expiration time.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }
}
