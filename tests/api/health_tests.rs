//! Health Check API Tests

use axum::http::StatusCode;

use crate::common::TestApp;

#[tokio::test]
async fn test_health_check_reports_model_and_clients() {
    let app = TestApp::new().await;
    app.state.pipeline.open_session("cam-1");
    app.state.pipeline.open_session("cam-2");

    let (status, json) = app.get_json("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["model_loaded"], true);
    assert_eq!(json["clients"], 2);
}

#[tokio::test]
async fn test_health_check_degraded_without_model() {
    let app = TestApp::degraded().await;

    let (status, json) = app.get_json("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["model_loaded"], false);
}

#[tokio::test]
async fn test_liveness_reports_alive() {
    let app = TestApp::degraded().await;

    let (status, json) = app.get_json("/health/live").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "alive");
}

#[tokio::test]
async fn test_readiness_follows_model() {
    let ready = TestApp::new().await;
    let (status, _) = ready.get_json("/health/ready").await;
    assert_eq!(status, StatusCode::OK);

    let degraded = TestApp::degraded().await;
    let (status, json) = degraded.get_json("/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["model_loaded"], false);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_prometheus_text() {
    let app = TestApp::new().await;

    let response = app.get("/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new().await;
    let response = app.get("/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
