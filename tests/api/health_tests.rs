//! Health Check API Tests

use axum::http::StatusCode;
use serde_json::Value;

use crate::common::TestApp;

/// Test basic health check endpoint returns 200 OK
#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new();

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
}

/// Test health check returns JSON with status field
#[tokio::test]
async fn test_health_check_returns_json() {
    let server = TestApp::new().server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert!(json.get("version").is_some());
}

/// Test liveness probe endpoint
#[tokio::test]
async fn test_liveness_probe() {
    let server = TestApp::new().server();

    let response = server.get("/health/live").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "alive");
}

/// Readiness reports live sessions and open connections
#[tokio::test]
async fn test_readiness_probe_counts_sessions() {
    let app = TestApp::new();
    app.state
        .registry
        .create_session(Default::default(), "Host")
        .unwrap();
    let server = app.server();

    let response = server.get("/health/ready").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "ready");
    assert_eq!(json["checks"]["active_sessions"], 1);
    assert_eq!(json["checks"]["active_connections"], 0);
}

/// Metrics are exposed in Prometheus text format
#[tokio::test]
async fn test_metrics_endpoint() {
    let server = TestApp::new().server();

    let response = server.get("/metrics").await;

    response.assert_status_ok();
    assert!(response.text().contains("quiz_server_sessions_active"));
}
