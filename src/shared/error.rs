//! Application Error Types
//!
//! Centralized error handling with Axum integration, plus the per-frame
//! error taxonomy used by the detection pipeline.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type (HTTP surface)
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, 10001, msg.clone()),
        };

        let body = ErrorResponse { code, message };

        (status, Json(body)).into_response()
    }
}

/// Per-frame detection failures.
///
/// Every variant is terminal for the frame that produced it and nothing else:
/// the session and its connection stay up.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    /// Empty, non-base64 or undecodable image payload
    #[error("Frame decode failed: {0}")]
    Decode(String),

    /// Detector was never initialized
    #[error("Detection model unavailable")]
    ModelUnavailable,

    /// Detector was reachable at startup but the call failed
    #[error("Detector backend error: {0}")]
    Backend(String),
}

impl DetectionError {
    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DetectionError::Decode(_) => "decode_error",
            DetectionError::ModelUnavailable => "model_unavailable",
            DetectionError::Backend(_) => "backend_error",
        }
    }
}

/// Alert delivery failures. Logged by the notification worker, never
/// propagated to the frame path.
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("Notifier transport error: {0}")]
    Transport(String),

    #[error("Notifier rejected alert: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for NotifierError {
    fn from(e: reqwest::Error) -> Self {
        NotifierError::Transport(e.to_string())
    }
}
