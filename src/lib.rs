//! Mailstats Cache - best-effort cache for mail summary stats and sync cursors
//!
//! Caches small numeric aggregates and opaque provider cursors per user,
//! never message content. Cache failures degrade to misses and are only
//! visible in the logs.

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod tasks;

pub use api::AppState;
pub use cache::StatsCursorCache;
pub use config::Config;
pub use session::SessionRegistry;
pub use tasks::spawn_cleanup_task;
