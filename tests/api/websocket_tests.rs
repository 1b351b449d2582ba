//! WebSocket Connection Tests
//!
//! Drives `serve_connection` over in-memory channels in place of a socket.

use std::time::Duration;

use axum::extract::ws::Message;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use detection_relay::presentation::websocket::serve_connection;

use crate::common::TestApp;

/// Client side of one in-memory connection
struct Client {
    inbound: UnboundedSender<Result<Message, axum::Error>>,
    outbound: UnboundedReceiver<Message>,
    task: JoinHandle<()>,
}

impl Client {
    fn connect(app: &TestApp, client_id: &str) -> Self {
        let (inbound, rx) = mpsc::unbounded();
        let (tx, outbound) = mpsc::unbounded();
        let task = tokio::spawn(serve_connection(
            app.state.clone(),
            client_id.to_string(),
            tx,
            rx,
        ));
        Self {
            inbound,
            outbound,
            task,
        }
    }

    fn send(&self, message: Value) {
        self.send_text(&message.to_string());
    }

    fn send_text(&self, text: &str) {
        self.inbound
            .unbounded_send(Ok(Message::Text(text.to_string().into())))
            .unwrap();
    }

    async fn next_event(&mut self) -> Value {
        let message = timeout(Duration::from_secs(2), self.outbound.next())
            .await
            .expect("timed out waiting for an event")
            .expect("connection closed");
        match message {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("unexpected message {:?}", other),
        }
    }

    /// Round-trip a `request_admin_frames`; everything sent before it has
    /// been handled once the reply arrives.
    async fn admin_frames(&mut self) -> Value {
        self.send(json!({ "event": "request_admin_frames" }));
        let event = self.next_event().await;
        assert_eq!(event["event"], "admin_frames");
        event["data"]["frames"].clone()
    }
}

#[tokio::test]
async fn test_connect_acknowledges_with_client_id() {
    let app = TestApp::new().await;
    let mut client = Client::connect(&app, "cam-1");

    let status = client.next_event().await;

    assert_eq!(
        status,
        json!({
            "event": "status",
            "data": { "msg": "Connected successfully", "client_id": "cam-1" }
        })
    );
    assert!(app.state.pipeline.registry().contains("cam-1"));
}

#[tokio::test]
async fn test_join_admin_twice_subscribes_once_and_receives_broadcasts() {
    let app = TestApp::new().await;
    let pipeline = app.state.pipeline.clone();
    let mut admin = Client::connect(&app, "admin");
    admin.next_event().await;

    admin.send(json!({ "event": "join_admin" }));
    admin.send(json!({ "event": "join_admin" }));
    admin.admin_frames().await;
    assert_eq!(pipeline.relay().subscriber_count(), 1);

    pipeline.open_session("cam");
    pipeline.handle_frame("cam", "abc").await;

    let event = admin.next_event().await;
    assert_eq!(event["event"], "processed_frame");
    assert_eq!(event["data"]["client_id"], "cam");
    assert_eq!(event["data"]["frame"], "annotated:abc");
}

#[tokio::test]
async fn test_leave_admin_stops_delivery() {
    let app = TestApp::new().await;
    let pipeline = app.state.pipeline.clone();
    let mut admin = Client::connect(&app, "admin");
    admin.next_event().await;

    admin.send(json!({ "event": "join_admin" }));
    admin.send(json!({ "event": "leave_admin" }));
    admin.admin_frames().await;
    assert_eq!(pipeline.relay().subscriber_count(), 0);

    pipeline.open_session("cam");
    pipeline.handle_frame("cam", "abc").await;

    // The next event is the reply, not the broadcast.
    let frames = admin.admin_frames().await;
    assert_eq!(frames, json!({ "cam": "annotated:abc" }));
}

#[tokio::test]
async fn test_frames_are_processed_and_listed() {
    let app = TestApp::new().await;
    let pipeline = app.state.pipeline.clone();
    let mut client = Client::connect(&app, "cam-1");
    client.next_event().await;

    client.send(json!({ "event": "frame", "data": { "frame": "abc" } }));

    timeout(Duration::from_secs(2), async {
        loop {
            let processed = pipeline
                .registry()
                .summary("cam-1")
                .map_or(0, |s| s.frames_processed);
            if processed == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("frame was not processed");

    let frames = client.admin_frames().await;
    assert_eq!(frames, json!({ "cam-1": "annotated:abc" }));
}

#[tokio::test]
async fn test_empty_frames_and_unknown_events_are_ignored() {
    let app = TestApp::new().await;
    let mut client = Client::connect(&app, "cam-1");
    client.next_event().await;

    client.send(json!({ "event": "frame" }));
    client.send(json!({ "event": "frame", "data": { "frame": "" } }));
    client.send(json!({ "event": "bogus", "data": 1 }));
    client.send_text("not json");

    let frames = client.admin_frames().await;
    assert_eq!(frames, json!({}));

    let summary = app.state.pipeline.registry().summary("cam-1").unwrap();
    assert_eq!(summary.frames_processed, 0);
    assert_eq!(summary.frames_dropped, 0);
}

#[tokio::test]
async fn test_close_removes_session_and_subscription() {
    let app = TestApp::new().await;
    let pipeline = app.state.pipeline.clone();
    let mut client = Client::connect(&app, "admin");
    client.next_event().await;
    client.send(json!({ "event": "join_admin" }));
    client.admin_frames().await;
    assert_eq!(pipeline.relay().subscriber_count(), 1);

    client.inbound.unbounded_send(Ok(Message::Close(None))).unwrap();
    timeout(Duration::from_secs(2), client.task)
        .await
        .expect("connection did not finish")
        .unwrap();

    assert!(!pipeline.registry().contains("admin"));
    assert_eq!(pipeline.relay().subscriber_count(), 0);
}

#[tokio::test]
async fn test_dropped_stream_ends_connection() {
    let app = TestApp::new().await;
    let mut client = Client::connect(&app, "cam-1");
    client.next_event().await;

    drop(client.inbound);
    timeout(Duration::from_secs(2), client.task)
        .await
        .expect("connection did not finish")
        .unwrap();

    assert!(app.state.pipeline.registry().is_empty());
}
