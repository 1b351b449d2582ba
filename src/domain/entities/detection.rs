//! Detection entity and the detector boundary.
//!
//! A `Detection` is one bounding box reported by the detector, in pixel
//! coordinates of the submitted image. On the wire it is a flat array
//! `[x1, y1, x2, y2, confidence, class_id]`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::error::DetectionError;

/// A single detected object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "DetectionTuple", into = "DetectionTuple")]
pub struct Detection {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub confidence: f32,
    pub class_id: u32,
}

type DetectionTuple = (i32, i32, i32, i32, f32, u32);

impl From<DetectionTuple> for Detection {
    fn from((x1, y1, x2, y2, confidence, class_id): DetectionTuple) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            confidence,
            class_id,
        }
    }
}

impl From<Detection> for DetectionTuple {
    fn from(d: Detection) -> Self {
        (d.x1, d.y1, d.x2, d.y2, d.confidence, d.class_id)
    }
}

/// Result of running the detector on one frame.
#[derive(Debug, Clone)]
pub struct OracleOutput {
    /// Annotated frame as a `data:image/jpeg;base64,` URI
    pub annotated_frame: String,

    /// Detections at or above the configured confidence threshold
    pub detections: Vec<Detection>,
}

impl OracleOutput {
    /// Whether this frame counts as a hit for the detection window.
    pub fn has_detection(&self) -> bool {
        !self.detections.is_empty()
    }
}

/// Detection oracle: encoded frame in, annotated frame and boxes out.
///
/// Implementations filter by confidence themselves; callers never see
/// detections below threshold.
#[async_trait]
pub trait DetectionOracle: Send + Sync {
    /// Whether the detector finished initialization.
    fn is_ready(&self) -> bool;

    /// Run detection on a wire-format frame (data URI or bare base64).
    async fn detect(&self, frame: &str) -> Result<OracleOutput, DetectionError>;
}
