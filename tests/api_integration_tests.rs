//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use mailstats_cache::backend::{ManualClock, MemoryBackend};
use mailstats_cache::{api::create_router, AppState, SessionRegistry, StatsCursorCache};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    create_test_app_with_clock().0
}

fn create_test_app_with_clock() -> (Router, ManualClock) {
    let clock = ManualClock::new();
    let backend = MemoryBackend::with_clock(Arc::new(clock.clone()));
    let cache = StatsCursorCache::new(Some(Arc::new(backend)));
    let state = AppState::new(cache, SessionRegistry::new());
    (create_router(state), clock)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

// == Stats Endpoint Tests ==

#[tokio::test]
async fn test_put_stats_success() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/stats/user-1")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"vips":["Bob","alice"],"new_count":3,"vip_count":1,"urgent_count":0}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("user-1"));
    assert!(json["message"].as_str().unwrap().contains("alice,bob"));
}

#[tokio::test]
async fn test_get_stats_round_trip_with_any_vip_order() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        "PUT",
        "/stats/user-1",
        Some(r#"{"vips":["Bob","alice"],"new_count":3,"vip_count":1,"urgent_count":0}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, "GET", "/stats/user-1?vips=ALICE,bob", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["newCount"], 3);
    assert_eq!(json["vipCount"], 1);
    assert_eq!(json["urgentCount"], 0);
    assert!(json["cachedAt"].is_string());

    // A different VIP set is a different entry
    let (status, _) = send(&app, "GET", "/stats/user-1?vips=alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_expire_after_ttl() {
    let (app, clock) = create_test_app_with_clock();

    send(
        &app,
        "PUT",
        "/stats/user-1",
        Some(r#"{"new_count":1,"vip_count":0,"urgent_count":0,"ttl":30}"#),
    )
    .await;

    let (status, _) = send(&app, "GET", "/stats/user-1", None).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(Duration::from_secs(30));

    let (status, json) = send(&app, "GET", "/stats/user-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn test_put_stats_rejects_zero_ttl() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/stats/user-1",
        Some(r#"{"new_count":1,"vip_count":0,"urgent_count":0,"ttl":0}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("ttl"));
}

#[tokio::test]
async fn test_put_stats_rejects_separator_in_user_id() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        "PUT",
        "/stats/user:1",
        Some(r#"{"new_count":1,"vip_count":0,"urgent_count":0}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_put_stats_malformed_json() {
    let app = create_test_app();

    let (status, _) = send(&app, "PUT", "/stats/user-1", Some(r#"{"new_count":"three"}"#)).await;

    assert!(status.is_client_error());
}

// == Cursor Endpoint Tests ==

#[tokio::test]
async fn test_cursor_round_trip() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        "PUT",
        "/cursors/user-1/gmail",
        Some(r#"{"gmail_history_id":"424242"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, "GET", "/cursors/user-1/gmail", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["gmailHistoryId"], "424242");
    assert!(json.get("outlookLastReceivedAt").is_none());

    let (status, _) = send(&app, "GET", "/cursors/user-1/outlook", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cursor_carries_last_stats() {
    let app = create_test_app();

    send(
        &app,
        "PUT",
        "/cursors/user-1/outlook",
        Some(
            r#"{"outlook_last_received_at":"2024-05-01T11:59:00Z",
                "last_stats":{"newCount":2,"vipCount":0,"urgentCount":1,"cachedAt":"2024-05-01T12:00:00Z"}}"#,
        ),
    )
    .await;

    let (status, json) = send(&app, "GET", "/cursors/user-1/outlook", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["outlookLastReceivedAt"], "2024-05-01T11:59:00Z");
    assert_eq!(json["lastStats"]["urgentCount"], 1);
}

#[tokio::test]
async fn test_cursor_outlives_stats() {
    let (app, clock) = create_test_app_with_clock();

    send(
        &app,
        "PUT",
        "/stats/user-1",
        Some(r#"{"new_count":1,"vip_count":0,"urgent_count":0}"#),
    )
    .await;
    send(
        &app,
        "PUT",
        "/cursors/user-1/gmail",
        Some(r#"{"gmail_history_id":"1"}"#),
    )
    .await;

    clock.advance(Duration::from_secs(300));

    let (stats_status, _) = send(&app, "GET", "/stats/user-1", None).await;
    let (cursor_status, _) = send(&app, "GET", "/cursors/user-1/gmail", None).await;
    assert_eq!(stats_status, StatusCode::NOT_FOUND);
    assert_eq!(cursor_status, StatusCode::OK);
}

// == Invalidation Endpoint Tests ==

#[tokio::test]
async fn test_invalidation_scope() {
    let app = create_test_app();

    send(
        &app,
        "PUT",
        "/stats/user-1",
        Some(r#"{"vips":["alice"],"new_count":1,"vip_count":1,"urgent_count":0}"#),
    )
    .await;
    send(
        &app,
        "PUT",
        "/stats/user-1",
        Some(r#"{"vips":["alice","bob"],"new_count":2,"vip_count":2,"urgent_count":0}"#),
    )
    .await;
    send(
        &app,
        "PUT",
        "/cursors/user-1/gmail",
        Some(r#"{"gmail_history_id":"9"}"#),
    )
    .await;

    let (status, _) = send(&app, "DELETE", "/users/user-1/cache/stats", None).await;
    assert_eq!(status, StatusCode::OK);

    let (s1, _) = send(&app, "GET", "/stats/user-1?vips=alice", None).await;
    let (s2, _) = send(&app, "GET", "/stats/user-1?vips=alice,bob", None).await;
    let (c1, _) = send(&app, "GET", "/cursors/user-1/gmail", None).await;
    assert_eq!(s1, StatusCode::NOT_FOUND);
    assert_eq!(s2, StatusCode::NOT_FOUND);
    assert_eq!(c1, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", "/users/user-1/cache", None).await;
    assert_eq!(status, StatusCode::OK);

    let (c1, _) = send(&app, "GET", "/cursors/user-1/gmail", None).await;
    assert_eq!(c1, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_new_mail_webhook_drops_stats_only() {
    let app = create_test_app();

    send(
        &app,
        "PUT",
        "/stats/user-7",
        Some(r#"{"new_count":1,"vip_count":0,"urgent_count":0}"#),
    )
    .await;
    send(
        &app,
        "PUT",
        "/cursors/user-7/gmail",
        Some(r#"{"gmail_history_id":"3"}"#),
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        "/webhooks/new-mail",
        Some(r#"{"user_id":"user-7"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (stats_status, _) = send(&app, "GET", "/stats/user-7", None).await;
    let (cursor_status, _) = send(&app, "GET", "/cursors/user-7/gmail", None).await;
    assert_eq!(stats_status, StatusCode::NOT_FOUND);
    assert_eq!(cursor_status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalidate_unknown_user_succeeds() {
    let app = create_test_app();

    let (status, json) = send(&app, "DELETE", "/users/ghost/cache", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("ghost"));
}

// == Session Endpoint Tests ==

#[tokio::test]
async fn test_session_lifecycle() {
    let app = create_test_app();

    let (status, json) = send(&app, "PUT", "/sessions/s-1", Some(r#"{"user_id":"user-1"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user_id"], "user-1");

    let (status, json) = send(&app, "GET", "/sessions/s-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["session_id"], "s-1");

    let (status, _) = send(&app, "DELETE", "/sessions/s-1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/sessions/s-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_rejects_empty_user() {
    let app = create_test_app();

    let (status, _) = send(&app, "PUT", "/sessions/s-1", Some(r#"{"user_id":""}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == Degraded Mode Tests ==

#[tokio::test]
async fn test_no_backend_every_endpoint_still_answers() {
    let state = AppState::new(StatsCursorCache::new(None), SessionRegistry::new());
    let app = create_router(state);

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["cache_enabled"], false);

    let (status, _) = send(
        &app,
        "PUT",
        "/stats/user-1",
        Some(r#"{"new_count":1,"vip_count":0,"urgent_count":0}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/stats/user-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/users/user-1/cache", None).await;
    assert_eq!(status, StatusCode::OK);
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["cache_enabled"], true);
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_test_app();

    let (status, _) = send(&app, "GET", "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
