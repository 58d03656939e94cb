//! Session Registry
//!
//! Process-wide keyed registry of active sessions. Created at startup,
//! handed to whoever needs it through application state, and cleared on
//! shutdown. Concurrent writes to the same session id: last writer wins.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// A registered session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// Shared session map. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `session` under `session_id`, returning the one it replaced.
    pub async fn insert(&self, session_id: impl Into<String>, session: Session) -> Option<Session> {
        self.sessions
            .write()
            .await
            .insert(session_id.into(), session)
    }

    pub async fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn remove(&self, session_id: &str) -> Option<Session> {
        self.sessions.write().await.remove(session_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drops every session, returning how many there were.
    pub async fn clear(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        sessions.clear();
        count
    }
}
