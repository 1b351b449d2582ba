//! Session API Tests

use axum::http::StatusCode;

use crate::common::TestApp;

#[tokio::test]
async fn test_list_sessions_sorted_with_admin_count() {
    let app = TestApp::new().await;
    let pipeline = &app.state.pipeline;
    pipeline.open_session("b-cam");
    pipeline.open_session("a-cam");
    let _admin = pipeline.relay().subscribe("a-cam");

    let (status, json) = app.get_json("/api/v1/sessions").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);
    assert_eq!(json["admins"], 1);
    assert_eq!(json["sessions"][0]["client_id"], "a-cam");
    assert_eq!(json["sessions"][1]["client_id"], "b-cam");
    assert_eq!(json["sessions"][0]["phase"], "connected");
}

#[tokio::test]
async fn test_get_session_after_frame() {
    let app = TestApp::new().await;
    app.state.pipeline.open_session("cam");
    app.state.pipeline.handle_frame("cam", "frame-bytes").await;

    let (status, json) = app.get_json("/api/v1/sessions/cam").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["client_id"], "cam");
    assert_eq!(json["phase"], "streaming");
    assert_eq!(json["consecutive_detections"], 1);
    assert_eq!(json["frames_processed"], 1);
    assert_eq!(json["has_frame"], true);
}

#[tokio::test]
async fn test_get_unknown_session_is_404() {
    let app = TestApp::new().await;

    let (status, json) = app.get_json("/api/v1/sessions/ghost").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], 10001);
}

#[tokio::test]
async fn test_closed_session_disappears() {
    let app = TestApp::new().await;
    app.state.pipeline.open_session("cam");
    app.state.pipeline.close_session("cam");

    let (status, _) = app.get_json("/api/v1/sessions/cam").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, json) = app.get_json("/api/v1/sessions").await;
    assert_eq!(json["total"], 0);
}

#[tokio::test]
async fn test_get_session_frame_returns_latest_annotation() {
    let app = TestApp::new().await;
    app.state.pipeline.open_session("cam");
    app.state.pipeline.handle_frame("cam", "frame-bytes").await;

    let (status, json) = app.get_json("/api/v1/sessions/cam/frame").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["client_id"], "cam");
    assert_eq!(json["frame"], "annotated:frame-bytes");
    assert_eq!(json["detections"][0], serde_json::json!([1, 2, 30, 40, 0.9, 0]));
    assert_eq!(json["consecutive_detections"], 1);
}

#[tokio::test]
async fn test_get_session_frame_is_404_before_first_frame() {
    let app = TestApp::new().await;
    app.state.pipeline.open_session("cam");

    let (status, json) = app.get_json("/api/v1/sessions/cam/frame").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Session cam has no frame yet");

    let (status, _) = app.get_json("/api/v1/sessions/ghost/frame").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
