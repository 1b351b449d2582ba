//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tower::ServiceExt;

use detection_relay::config::{
    CorsSettings, DetectionSettings, NotifierSettings, RelaySettings, ServerSettings, Settings,
    WebSocketSettings,
};
use detection_relay::domain::{Alert, AlertNotifier, Detection, DetectionOracle, OracleOutput};
use detection_relay::shared::error::{DetectionError, NotifierError};
use detection_relay::startup::{build_router, AppState};

/// Oracle that reports a detection whenever `hit` is set.
pub struct StubOracle {
    pub ready: bool,
    pub hit: AtomicBool,
}

impl StubOracle {
    pub fn new(ready: bool) -> Self {
        Self {
            ready,
            hit: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl DetectionOracle for StubOracle {
    fn is_ready(&self) -> bool {
        self.ready
    }

    async fn detect(&self, frame: &str) -> Result<OracleOutput, DetectionError> {
        if !self.ready {
            return Err(DetectionError::ModelUnavailable);
        }
        if frame.is_empty() {
            return Err(DetectionError::Decode("empty frame payload".into()));
        }
        let detections = if self.hit.load(Ordering::SeqCst) {
            vec![Detection {
                x1: 1,
                y1: 2,
                x2: 30,
                y2: 40,
                confidence: 0.9,
                class_id: 0,
            }]
        } else {
            Vec::new()
        };
        Ok(OracleOutput {
            annotated_frame: format!("annotated:{}", frame),
            detections,
        })
    }
}

/// Notifier that records every alert it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    pub alerts: Mutex<Vec<Alert>>,
    pub delivered: Notify,
}

#[async_trait]
impl AlertNotifier for RecordingNotifier {
    async fn notify(&self, alert: &Alert) -> Result<(), NotifierError> {
        self.alerts.lock().push(alert.clone());
        self.delivered.notify_one();
        Ok(())
    }
}

pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        detection: DetectionSettings::default(),
        notifier: NotifierSettings {
            admin_email: "admin@example.com".into(),
            sender: "alerts@example.com".into(),
            webhook_url: None,
            queue_capacity: 16,
        },
        relay: RelaySettings {
            subscriber_buffer: 16,
        },
        cors: CorsSettings {
            allowed_origins: Vec::new(),
        },
        websocket: WebSocketSettings {
            max_message_size: 1 << 20,
            max_frame_size: 1 << 20,
        },
        environment: "test".into(),
    }
}

/// Test application builder
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub oracle: Arc<StubOracle>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    /// Application with a loaded stub detector
    pub async fn new() -> Self {
        Self::with_oracle(StubOracle::new(true)).await
    }

    /// Application whose detector failed to load
    pub async fn degraded() -> Self {
        Self::with_oracle(StubOracle::new(false)).await
    }

    async fn with_oracle(oracle: StubOracle) -> Self {
        let oracle = Arc::new(oracle);
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::new(test_settings(), oracle.clone(), notifier.clone());
        let router = build_router(state.clone());

        Self {
            state,
            router,
            oracle,
            notifier,
        }
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    /// GET and parse the body as JSON
    pub async fn get_json(&self, uri: &str) -> (axum::http::StatusCode, serde_json::Value) {
        let response = self.get(uri).await;
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}
