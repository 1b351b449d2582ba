//! Outbound WebSocket Events
//!
//! Every server-to-client message is an `{"event": ..., "data": ...}` object.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Alert, Detection};

/// Server-to-client event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Connection acknowledgment carrying the assigned session id
    Status(StatusPayload),
    /// Annotated frame from one producer, for the admin audience
    ProcessedFrame(ProcessedFramePayload),
    /// Sustained-detection alert, for the admin audience
    Alert(AlertPayload),
    /// Latest annotated frame of every session, sent to the requester only
    AdminFrames(AdminFramesPayload),
}

impl ServerEvent {
    /// Get the event name for logging
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerEvent::Status(_) => "status",
            ServerEvent::ProcessedFrame(_) => "processed_frame",
            ServerEvent::Alert(_) => "alert",
            ServerEvent::AdminFrames(_) => "admin_frames",
        }
    }

    pub fn connected(client_id: impl Into<String>) -> Self {
        ServerEvent::Status(StatusPayload {
            msg: "Connected successfully".into(),
            client_id: client_id.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusPayload {
    pub msg: String,
    pub client_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedFramePayload {
    pub frame: String,
    pub client_id: String,
    pub detections: Vec<Detection>,
    pub consecutive_detections: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertPayload {
    pub client_id: String,
    pub consecutive: usize,
}

/// Session id to latest annotated frame (data URI)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminFramesPayload {
    pub frames: BTreeMap<String, String>,
}

impl From<&Alert> for AlertPayload {
    fn from(alert: &Alert) -> Self {
        Self {
            client_id: alert.client_id.clone(),
            consecutive: alert.consecutive,
        }
    }
}
