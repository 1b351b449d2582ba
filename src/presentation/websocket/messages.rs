//! WebSocket Message Types
//!
//! Inbound messages share the outbound envelope: `{"event": ..., "data": ...}`.

use serde::Deserialize;

/// Raw inbound envelope
#[derive(Debug, Deserialize)]
pub struct ClientMessage {
    pub event: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// `frame` event data
#[derive(Debug, Default, Deserialize)]
pub struct FramePayload {
    #[serde(default)]
    pub frame: Option<String>,
}

/// Client-to-server event
#[derive(Debug, PartialEq, Eq)]
pub enum ClientEvent {
    /// A frame from a producer; `None` when the payload carried no frame
    Frame(Option<String>),
    /// Join the admin broadcast audience
    JoinAdmin,
    /// Leave the admin broadcast audience
    LeaveAdmin,
    /// Ask for the latest frame of every session
    RequestAdminFrames,
    /// Anything else; ignored
    Unknown(String),
}

impl ClientEvent {
    /// Parse a text message. Fails only on malformed JSON or a missing
    /// `event` field.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let message: ClientMessage = serde_json::from_str(text)?;

        Ok(match message.event.as_str() {
            "frame" => {
                let payload = message
                    .data
                    .and_then(|d| serde_json::from_value::<FramePayload>(d).ok())
                    .unwrap_or_default();
                ClientEvent::Frame(payload.frame.filter(|f| !f.is_empty()))
            }
            "join_admin" => ClientEvent::JoinAdmin,
            "leave_admin" => ClientEvent::LeaveAdmin,
            "request_admin_frames" => ClientEvent::RequestAdminFrames,
            _ => ClientEvent::Unknown(message.event),
        })
    }
}
