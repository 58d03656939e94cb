//! Cache Module
//!
//! Stats and sync-cursor caching over a pluggable backend, with key
//! namespacing, TTL policy and per-user invalidation.

pub mod keys;
mod stats_cursor;
mod values;


use std::time::Duration;

// Re-export public types
pub use keys::{KeyBuilder, VipFingerprint};
pub use stats_cursor::StatsCursorCache;
pub use values::{CachedStats, StatsCounts, SyncCursor};

// == Public Constants ==
/// Stats are cheap to recompute and wrong if stale for long
pub const DEFAULT_STATS_TTL: Duration = Duration::from_secs(120);

/// Cursors only cost a re-scan when lost
pub const DEFAULT_CURSOR_TTL: Duration = Duration::from_secs(600);
