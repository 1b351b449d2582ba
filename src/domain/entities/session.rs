//! Producer session entity.
//!
//! One `Session` exists per connected frame producer. It owns every piece of
//! derived per-producer state (gate timestamp, detection window, alert
//! cooldown) so that removing the session removes all of it at once.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::detection::{Detection, OracleOutput};
use crate::domain::services::{AlertDecision, AlertPolicy, DetectionWindow, IngestGate};

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Registered, no frame processed yet
    Connected,
    /// At least one frame processed
    Streaming,
    /// Terminal; the registry entry is gone
    Disconnected,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Streaming => "streaming",
            Self::Disconnected => "disconnected",
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State changes produced by recording one detection result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameUpdate {
    pub consecutive: usize,
    pub alert: AlertDecision,
}

/// Server-side state for one connected producer.
#[derive(Debug)]
pub struct Session {
    /// Connection identifier, stable for the connection's lifetime
    pub id: String,

    /// Lifecycle phase
    pub phase: SessionPhase,

    /// Most recent annotated frame (data URI)
    pub last_frame: Option<String>,

    /// Detections of the most recent processed frame
    pub detections: Vec<Detection>,

    /// Hits in the detection window
    pub consecutive_count: usize,

    /// When the gate last admitted a frame
    pub last_processed_at: Option<Instant>,

    /// When the last alert fired
    pub last_alert_at: Option<Instant>,

    /// Wall-clock connect time, for listings
    pub connected_at: DateTime<Utc>,

    /// Frames that went through detection successfully
    pub frames_processed: u64,

    /// Frames rejected by the gate
    pub frames_dropped: u64,

    window: DetectionWindow,
}

impl Session {
    /// Create a session with a detection window of `window_capacity`.
    pub fn new(id: impl Into<String>, window_capacity: usize) -> Self {
        Self {
            id: id.into(),
            phase: SessionPhase::Connected,
            last_frame: None,
            detections: Vec::new(),
            consecutive_count: 0,
            last_processed_at: None,
            last_alert_at: None,
            connected_at: Utc::now(),
            frames_processed: 0,
            frames_dropped: 0,
            window: DetectionWindow::new(window_capacity),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.phase == SessionPhase::Disconnected
    }

    /// Read-only view of the detection window.
    pub fn window(&self) -> &DetectionWindow {
        &self.window
    }

    /// Ask the gate whether a frame arriving at `now` may be processed.
    ///
    /// On admission the gate timestamp is stored immediately, before any
    /// detection runs. `now` is the arrival time, so a frame that waited in
    /// the connection's queue is gated as if it had been checked on arrival.
    pub fn admit_frame(&mut self, gate: &IngestGate, now: Instant) -> bool {
        if self.is_closed() {
            return false;
        }
        if gate.should_process(self.last_processed_at, now) {
            self.last_processed_at = Some(now);
            true
        } else {
            self.frames_dropped += 1;
            false
        }
    }

    /// Count a frame that was dropped before reaching the gate.
    pub fn skip_frame(&mut self) {
        self.frames_dropped += 1;
    }

    /// Apply a successful detection result: update the window, evaluate the
    /// alert condition and store the latest frame.
    ///
    /// When the policy fires, `last_alert_at` is set to `now` here so the
    /// cooldown holds even if delivery later fails.
    pub fn record_detection(
        &mut self,
        output: &OracleOutput,
        policy: &AlertPolicy,
        now: Instant,
    ) -> FrameUpdate {
        let consecutive = self.window.push(output.has_detection());
        self.consecutive_count = consecutive;

        let alert = policy.evaluate(consecutive, self.last_alert_at, now);
        if alert.fired() {
            self.last_alert_at = Some(now);
        }

        self.detections = output.detections.clone();
        self.last_frame = Some(output.annotated_frame.clone());
        self.frames_processed += 1;
        self.phase = SessionPhase::Streaming;

        FrameUpdate { consecutive, alert }
    }

    /// Mark the session terminal and release its frame data.
    pub fn close(&mut self) {
        self.phase = SessionPhase::Disconnected;
        self.last_frame = None;
        self.detections.clear();
    }
}
