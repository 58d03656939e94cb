//! Cached Values
//!
//! The only things ever written to the backend: three aggregate counts and
//! opaque provider cursors. No message content is representable here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Stats Counts ==
/// Aggregate counts produced by the stats workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsCounts {
    pub new_count: u64,
    pub vip_count: u64,
    pub urgent_count: u64,
}

// == Cached Stats ==
/// Stats as stored: the counts plus the time the cache wrote them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedStats {
    pub new_count: u64,
    pub vip_count: u64,
    pub urgent_count: u64,
    pub cached_at: DateTime<Utc>,
}

impl CachedStats {
    /// Stamps `counts` with `cached_at`.
    pub fn new(counts: StatsCounts, cached_at: DateTime<Utc>) -> Self {
        Self {
            new_count: counts.new_count,
            vip_count: counts.vip_count,
            urgent_count: counts.urgent_count,
            cached_at,
        }
    }

    pub fn counts(&self) -> StatsCounts {
        StatsCounts {
            new_count: self.new_count,
            vip_count: self.vip_count,
            urgent_count: self.urgent_count,
        }
    }
}

// == Sync Cursor ==
/// How far the sync workflow got with each provider.
///
/// `last_stats` lets the sync workflow reuse the previous result when a
/// poll finds nothing newer than the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCursor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmail_history_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlook_last_received_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_stats: Option<CachedStats>,
}
