//! End-to-end pipeline tests through the shared application state.

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use detection_relay::application::dto::ServerEvent;
use detection_relay::application::services::PipelineOutcome;

use crate::common::TestApp;

#[tokio::test]
async fn test_sustained_detection_alerts_admin_and_notifier() {
    let app = TestApp::new().await;
    let pipeline = &app.state.pipeline;
    pipeline.open_session("cam");
    let mut admin = pipeline.relay().subscribe("admin").unwrap();

    let start = Instant::now();
    for i in 0..5 {
        pipeline
            .handle_frame_at("cam", "jpeg", start + Duration::from_secs(i))
            .await;
    }

    let mut events = Vec::new();
    while let Ok(event) = admin.try_recv() {
        events.push(event);
    }
    let names: Vec<_> = events.iter().map(|e| e.event_name()).collect();
    assert_eq!(
        names,
        vec![
            "processed_frame",
            "processed_frame",
            "processed_frame",
            "processed_frame",
            "alert",
            "processed_frame"
        ]
    );
    match events[4].as_ref() {
        ServerEvent::Alert(alert) => {
            assert_eq!(alert.client_id, "cam");
            assert_eq!(alert.consecutive, 5);
        }
        other => panic!("expected alert, got {:?}", other),
    }

    tokio::time::timeout(Duration::from_secs(2), app.notifier.delivered.notified())
        .await
        .expect("alert was not delivered");
    let alerts = app.notifier.alerts.lock();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].client_id, "cam");
}

#[tokio::test]
async fn test_window_recovers_after_misses() {
    let app = TestApp::new().await;
    let pipeline = &app.state.pipeline;
    pipeline.open_session("cam");

    let start = Instant::now();
    let mut counts = Vec::new();
    for (i, hit) in [true, true, false, true].into_iter().enumerate() {
        app.oracle.hit.store(hit, Ordering::SeqCst);
        let outcome = pipeline
            .handle_frame_at("cam", "jpeg", start + Duration::from_secs(i as u64))
            .await;
        match outcome {
            PipelineOutcome::Processed { consecutive, .. } => counts.push(consecutive),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    assert_eq!(counts, vec![1, 2, 2, 3]);
}

#[tokio::test]
async fn test_degraded_model_fails_frames_without_touching_state() {
    let app = TestApp::degraded().await;
    let pipeline = &app.state.pipeline;
    pipeline.open_session("cam");
    let mut admin = pipeline.relay().subscribe("admin").unwrap();

    let outcome = pipeline.handle_frame("cam", "jpeg").await;

    assert!(matches!(outcome, PipelineOutcome::Failed(_)));
    assert!(admin.try_recv().is_err());
    let summary = pipeline.registry().summary("cam").unwrap();
    assert_eq!(summary.frames_processed, 0);
    assert!(!summary.has_frame);
}

#[tokio::test]
async fn test_admin_leaving_stops_delivery() {
    let app = TestApp::new().await;
    let pipeline = &app.state.pipeline;
    pipeline.open_session("cam");
    let mut admin = pipeline.relay().subscribe("admin").unwrap();

    let start = Instant::now();
    pipeline.handle_frame_at("cam", "one", start).await;
    pipeline.close_session("admin");
    pipeline
        .handle_frame_at("cam", "two", start + Duration::from_secs(1))
        .await;

    let first = admin.try_recv().unwrap();
    match first.as_ref() {
        ServerEvent::ProcessedFrame(frame) => assert_eq!(frame.frame, "annotated:one"),
        other => panic!("expected processed_frame, got {:?}", other),
    }
    assert!(admin.try_recv().is_err());
}
