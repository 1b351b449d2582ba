//! Response DTOs
//!
//! Data structures for HTTP response bodies.

use serde::Serialize;

use crate::domain::{Detection, Session, SessionPhase};

/// Read-only view of one producer session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub client_id: String,
    pub phase: SessionPhase,
    pub consecutive_detections: usize,
    pub detections: usize,
    pub frames_processed: u64,
    pub frames_dropped: u64,
    pub has_frame: bool,
    pub connected_at: String,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            client_id: session.id.clone(),
            phase: session.phase,
            consecutive_detections: session.consecutive_count,
            detections: session.detections.len(),
            frames_processed: session.frames_processed,
            frames_dropped: session.frames_dropped,
            has_frame: session.last_frame.is_some(),
            connected_at: session.connected_at.to_rfc3339(),
        }
    }
}

/// Latest annotated frame of one session with the detections drawn on it
#[derive(Debug, Clone, Serialize)]
pub struct LatestFrame {
    pub client_id: String,
    pub frame: String,
    pub detections: Vec<Detection>,
    pub consecutive_detections: usize,
}

impl LatestFrame {
    /// `None` until the session has a processed frame.
    pub fn from_session(session: &Session) -> Option<Self> {
        let frame = session.last_frame.clone()?;
        Some(Self {
            client_id: session.id.clone(),
            frame,
            detections: session.detections.clone(),
            consecutive_detections: session.consecutive_count,
        })
    }
}
