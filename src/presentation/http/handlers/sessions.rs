//! Session Handlers
//!
//! Read-only views of the connected producer sessions.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::application::dto::{LatestFrame, SessionSummary};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Session list response
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionSummary>,
    pub total: usize,
    pub admins: usize,
}

/// GET /api/v1/sessions
pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    let sessions = state.pipeline.registry().snapshot();
    Json(SessionListResponse {
        total: sessions.len(),
        admins: state.pipeline.relay().subscriber_count(),
        sessions,
    })
}

/// GET /api/v1/sessions/{client_id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<SessionSummary>, AppError> {
    state
        .pipeline
        .registry()
        .summary(&client_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", client_id)))
}

/// GET /api/v1/sessions/{client_id}/frame
///
/// 404 until the session has a processed frame.
pub async fn get_session_frame(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<Json<LatestFrame>, AppError> {
    let registry = state.pipeline.registry();
    if !registry.contains(&client_id) {
        return Err(AppError::NotFound(format!("Session {} not found", client_id)));
    }
    registry
        .latest_frame(&client_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Session {} has no frame yet", client_id)))
}
