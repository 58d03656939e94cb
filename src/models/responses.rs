//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing HTTP response bodies. Cached stats and
//! cursors are returned in their stored JSON form.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::session::Session;

/// Response body for writes and invalidations
#[derive(Debug, Clone, Serialize)]
pub struct AckResponse {
    /// What was done
    pub message: String,
}

impl AckResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for `GET|PUT /sessions/:session_id`
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl SessionResponse {
    pub fn new(session_id: impl Into<String>, session: Session) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: session.user_id,
            created_at: session.created_at,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Whether a cache backend is configured; `false` means every lookup misses
    pub cache_enabled: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(cache_enabled: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            cache_enabled,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
