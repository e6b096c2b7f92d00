mod common;

use axum::http::{Method, StatusCode};
use common::{send, spawn_router};
use serde_json::json;

#[tokio::test]
async fn landing_page_renders_html() {
    let app = spawn_router();

    let response = send(&app, Method::GET, "/", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("text/html")));
    assert!(response.text.contains("Recipe Service"));
    assert!(response.text.contains("/api/recipes"));
}

#[tokio::test]
async fn unknown_route_returns_404_json() {
    let app = spawn_router();

    let response = send(&app, Method::GET, "/api/ingredients", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.json(),
        json!({ "success": false, "message": "Route not found" })
    );
}

#[tokio::test]
async fn unsupported_method_on_known_path_returns_404_json() {
    let app = spawn_router();

    let response = send(&app, Method::PATCH, "/api/recipes", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["message"], "Route not found");
}

#[tokio::test]
async fn health_check_works() {
    let app = spawn_router();

    let response = send(&app, Method::GET, "/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "recipe-service");
}

#[tokio::test]
async fn readiness_check_works() {
    let app = spawn_router();

    let response = send(&app, Method::GET, "/ready", None).await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn metrics_endpoint_returns_text() {
    let app = spawn_router();

    let response = send(&app, Method::GET, "/metrics", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("text/plain")));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = spawn_router();

    let request = axum::http::Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "trace-me");
}
