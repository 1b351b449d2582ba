//! Data Transfer Objects
//!
//! DTOs for WebSocket events and HTTP response bodies.

pub mod events;
pub mod response;

pub use events::{
    AdminFramesPayload, AlertPayload, ProcessedFramePayload, ServerEvent, StatusPayload,
};
pub use response::{LatestFrame, SessionSummary};
