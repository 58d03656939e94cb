//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::keys::validate_component;
use crate::cache::{CachedStats, StatsCursorCache, SyncCursor};
use crate::error::{ApiError, Result};
use crate::models::{
    AckResponse, HealthResponse, NewMailNotification, RegisterSessionRequest, SessionResponse,
    SetCursorRequest, SetStatsRequest, StatsQuery,
};
use crate::session::{Session, SessionRegistry};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Stats and cursor cache
    pub cache: StatsCursorCache,
    /// Active sessions
    pub sessions: SessionRegistry,
}

impl AppState {
    /// Creates a new AppState from a cache and a session registry.
    pub fn new(cache: StatsCursorCache, sessions: SessionRegistry) -> Self {
        Self { cache, sessions }
    }
}

/// Handler for GET /stats/:user_id
///
/// Returns the cached stats for the user and the VIP set in `?vips=`.
pub async fn get_stats_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<CachedStats>> {
    validate_component("user id", &user_id)?;
    let vips = query.fingerprint();

    state
        .cache
        .get_stats(&user_id, &vips)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("stats for user '{}' ({})", user_id, vips)))
}

/// Handler for PUT /stats/:user_id
pub async fn set_stats_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<SetStatsRequest>,
) -> Result<Json<AckResponse>> {
    validate_component("user id", &user_id)?;
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }
    let vips = req.fingerprint();
    validate_component("VIP fingerprint", vips.as_str())?;

    state
        .cache
        .set_stats(
            &user_id,
            &vips,
            req.counts(),
            req.ttl.map(Duration::from_secs),
        )
        .await;

    Ok(Json(AckResponse::new(format!(
        "Stats cached for user '{}' ({})",
        user_id, vips
    ))))
}

/// Handler for GET /cursors/:user_id/:source
pub async fn get_cursor_handler(
    State(state): State<AppState>,
    Path((user_id, source)): Path<(String, String)>,
) -> Result<Json<SyncCursor>> {
    validate_component("user id", &user_id)?;
    validate_component("source", &source)?;

    state
        .cache
        .get_sync_cursor(&user_id, &source)
        .await
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(format!("{} cursor for user '{}'", source, user_id))
        })
}

/// Handler for PUT /cursors/:user_id/:source
pub async fn set_cursor_handler(
    State(state): State<AppState>,
    Path((user_id, source)): Path<(String, String)>,
    Json(req): Json<SetCursorRequest>,
) -> Result<Json<AckResponse>> {
    validate_component("user id", &user_id)?;
    validate_component("source", &source)?;
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    state
        .cache
        .set_sync_cursor(
            &user_id,
            &source,
            &req.cursor(),
            req.ttl.map(Duration::from_secs),
        )
        .await;

    Ok(Json(AckResponse::new(format!(
        "{} cursor cached for user '{}'",
        source, user_id
    ))))
}

/// Handler for DELETE /users/:user_id/cache
///
/// Drops every cached stats and cursor entry of the user.
pub async fn invalidate_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<AckResponse>> {
    validate_component("user id", &user_id)?;
    state.cache.invalidate_user(&user_id).await;

    Ok(Json(AckResponse::new(format!(
        "Cache invalidated for user '{}'",
        user_id
    ))))
}

/// Handler for DELETE /users/:user_id/cache/stats
///
/// Drops cached stats of the user, keeping sync cursors.
pub async fn invalidate_stats_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<AckResponse>> {
    validate_component("user id", &user_id)?;
    state.cache.invalidate_stats(&user_id).await;

    Ok(Json(AckResponse::new(format!(
        "Stats invalidated for user '{}'",
        user_id
    ))))
}

/// Handler for POST /webhooks/new-mail
///
/// New mail changes the counts but not how far sync has progressed, so only
/// the stats sub-cache is dropped.
pub async fn new_mail_handler(
    State(state): State<AppState>,
    Json(notification): Json<NewMailNotification>,
) -> Result<Json<AckResponse>> {
    invalidate_stats_handler(State(state), Path(notification.user_id)).await
}

/// Handler for PUT /sessions/:session_id
pub async fn register_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<RegisterSessionRequest>,
) -> Result<Json<SessionResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let session = Session::new(req.user_id);
    state.sessions.insert(session_id.clone(), session.clone()).await;

    Ok(Json(SessionResponse::new(session_id, session)))
}

/// Handler for GET /sessions/:session_id
pub async fn get_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>> {
    let session = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("session '{}'", session_id)))?;

    Ok(Json(SessionResponse::new(session_id, session)))
}

/// Handler for DELETE /sessions/:session_id
pub async fn end_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<AckResponse>> {
    state
        .sessions
        .remove(&session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("session '{}'", session_id)))?;

    Ok(Json(AckResponse::new(format!(
        "Session '{}' ended",
        session_id
    ))))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.is_enabled()))
}
