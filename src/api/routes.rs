//! API Routes
//!
//! Configures the Axum router with all cache service endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    end_session_handler, get_cursor_handler, get_session_handler, get_stats_handler,
    health_handler, invalidate_stats_handler, invalidate_user_handler, new_mail_handler,
    register_session_handler, set_cursor_handler, set_stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET|PUT /stats/:user_id` - Cached stats for a user and VIP set
/// - `GET|PUT /cursors/:user_id/:source` - Sync cursor for a user and source
/// - `DELETE /users/:user_id/cache` - Drop all cached data of a user
/// - `DELETE /users/:user_id/cache/stats` - Drop cached stats of a user
/// - `POST /webhooks/new-mail` - New-mail notification, drops stats
/// - `PUT|GET|DELETE /sessions/:session_id` - Session registry
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/stats/:user_id", get(get_stats_handler).put(set_stats_handler))
        .route(
            "/cursors/:user_id/:source",
            get(get_cursor_handler).put(set_cursor_handler),
        )
        .route("/users/:user_id/cache", delete(invalidate_user_handler))
        .route(
            "/users/:user_id/cache/stats",
            delete(invalidate_stats_handler),
        )
        .route("/webhooks/new-mail", post(new_mail_handler))
        .route(
            "/sessions/:session_id",
            put(register_session_handler)
                .get(get_session_handler)
                .delete(end_session_handler),
        )
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::StatsCursorCache;
    use crate::session::SessionRegistry;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let state = AppState::new(StatsCursorCache::new(None), SessionRegistry::new());
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_set_stats_without_backend_still_succeeds() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/stats/u1")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"new_count":1,"vip_count":0,"urgent_count":0}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_stats_not_cached() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/stats/u1?vips=alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalidate_user_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/users/u1/cache")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
