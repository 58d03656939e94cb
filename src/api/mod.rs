//! API Module
//!
//! HTTP handlers and routing for the cache service REST API.
//!
//! # Endpoints
//! - `GET|PUT /stats/:user_id` - Cached stats
//! - `GET|PUT /cursors/:user_id/:source` - Sync cursors
//! - `DELETE /users/:user_id/cache` - Full user invalidation
//! - `DELETE /users/:user_id/cache/stats` - Stats-only invalidation
//! - `POST /webhooks/new-mail` - New-mail trigger
//! - `PUT|GET|DELETE /sessions/:session_id` - Session registry
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
