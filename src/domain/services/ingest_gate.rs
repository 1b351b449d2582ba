//! Per-session frame-rate gate.

use std::time::{Duration, Instant};

/// Admits at most one frame per `interval` for a session.
#[derive(Debug, Clone, Copy)]
pub struct IngestGate {
    interval: Duration,
}

impl IngestGate {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Whether a frame arriving at `now` may be processed, given when the
    /// session last had a frame admitted.
    pub fn should_process(&self, last_processed_at: Option<Instant>, now: Instant) -> bool {
        match last_processed_at {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }
}
