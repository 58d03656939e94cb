//! Request DTOs for the cache service API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::cache::{CachedStats, StatsCounts, SyncCursor, VipFingerprint};

/// Request body for `PUT /stats/:user_id`
///
/// # Fields
/// - `vips`: VIP identifiers the counts were computed for
/// - `new_count`, `vip_count`, `urgent_count`: the aggregate counts
/// - `ttl`: Optional TTL in seconds (uses the stats default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetStatsRequest {
    #[serde(default)]
    pub vips: Vec<String>,
    pub new_count: u64,
    pub vip_count: u64,
    pub urgent_count: u64,
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetStatsRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_ttl(self.ttl)
    }

    pub fn fingerprint(&self) -> VipFingerprint {
        VipFingerprint::from_vips(&self.vips)
    }

    pub fn counts(&self) -> StatsCounts {
        StatsCounts {
            new_count: self.new_count,
            vip_count: self.vip_count,
            urgent_count: self.urgent_count,
        }
    }
}

/// Request body for `PUT /cursors/:user_id/:source`
#[derive(Debug, Clone, Deserialize)]
pub struct SetCursorRequest {
    #[serde(default)]
    pub gmail_history_id: Option<String>,
    #[serde(default)]
    pub outlook_last_received_at: Option<String>,
    #[serde(default)]
    pub last_stats: Option<CachedStats>,
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetCursorRequest {
    pub fn validate(&self) -> Option<String> {
        validate_ttl(self.ttl)
    }

    pub fn cursor(&self) -> SyncCursor {
        SyncCursor {
            gmail_history_id: self.gmail_history_id.clone(),
            outlook_last_received_at: self.outlook_last_received_at.clone(),
            last_stats: self.last_stats.clone(),
        }
    }
}

/// Query string for `GET /stats/:user_id`, e.g. `?vips=alice@x.io,bob@x.io`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub vips: Option<String>,
}

impl StatsQuery {
    pub fn fingerprint(&self) -> VipFingerprint {
        match &self.vips {
            Some(vips) => VipFingerprint::from_vips([vips]),
            None => VipFingerprint::empty(),
        }
    }
}

/// Request body for `POST /webhooks/new-mail`
#[derive(Debug, Clone, Deserialize)]
pub struct NewMailNotification {
    pub user_id: String,
}

/// Request body for `PUT /sessions/:session_id`
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterSessionRequest {
    pub user_id: String,
}

impl RegisterSessionRequest {
    pub fn validate(&self) -> Option<String> {
        if self.user_id.trim().is_empty() {
            return Some("user_id cannot be empty".to_string());
        }
        None
    }
}

fn validate_ttl(ttl: Option<u64>) -> Option<String> {
    match ttl {
        Some(0) => Some("ttl must be at least 1 second".to_string()),
        _ => None,
    }
}
