//! Health Check Handlers
//!
//! # Endpoints
//! - `GET /health` - Service status, detector state and connected clients
//! - `GET /health/live` - Liveness check (is the server running?)
//! - `GET /health/ready` - Readiness check (is the detector loaded?)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::time::Instant;

use crate::startup::AppState;

/// Server start time for uptime calculation
static SERVER_START: Lazy<Instant> = Lazy::new(Instant::now);
static SERVER_START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Initialize the server start time (call during startup)
pub fn init_server_start() {
    Lazy::force(&SERVER_START);
    Lazy::force(&SERVER_START_TIME);
}

/// Basic health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub model_loaded: bool,
    pub clients: usize,
    pub version: &'static str,
}

/// Readiness response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: HealthStatus,
    pub model_loaded: bool,
    pub admins: usize,
    pub uptime_seconds: u64,
    pub started_at: String,
}

/// Overall health status
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

impl HealthStatus {
    fn from_model(model_loaded: bool) -> Self {
        if model_loaded {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        }
    }
}

/// Simple liveness response
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

/// Service status. Always 200; a missing detector shows as `degraded`.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.oracle.is_ready();
    Json(HealthResponse {
        status: HealthStatus::from_model(model_loaded),
        model_loaded,
        clients: state.pipeline.registry().len(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Liveness check - the server is up and serving
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "alive" })
}

/// Readiness check - 503 while the detector is unavailable, since every
/// frame would fail
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let model_loaded = state.oracle.is_ready();
    let response = ReadinessResponse {
        status: HealthStatus::from_model(model_loaded),
        model_loaded,
        admins: state.pipeline.relay().subscriber_count(),
        uptime_seconds: SERVER_START.elapsed().as_secs(),
        started_at: SERVER_START_TIME.to_rfc3339(),
    };

    let status_code = if model_loaded {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
