//! Alert debounce policy.

use std::time::{Duration, Instant};

/// Outcome of evaluating the alert condition for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDecision {
    Fire,
    /// Count below threshold
    BelowThreshold,
    /// Threshold met but the previous alert is too recent
    CoolingDown,
}

impl AlertDecision {
    pub fn fired(&self) -> bool {
        matches!(self, AlertDecision::Fire)
    }
}

/// Threshold plus per-session cooldown.
#[derive(Debug, Clone, Copy)]
pub struct AlertPolicy {
    threshold: usize,
    cooldown: Duration,
}

impl AlertPolicy {
    pub fn new(threshold: usize, cooldown: Duration) -> Self {
        Self { threshold, cooldown }
    }

    /// Fires iff `count >= threshold` and strictly more than `cooldown` has
    /// elapsed since the last alert (or there was none).
    pub fn evaluate(
        &self,
        count: usize,
        last_alert_at: Option<Instant>,
        now: Instant,
    ) -> AlertDecision {
        if count < self.threshold {
            return AlertDecision::BelowThreshold;
        }
        match last_alert_at {
            Some(last) if now.saturating_duration_since(last) <= self.cooldown => {
                AlertDecision::CoolingDown
            }
            _ => AlertDecision::Fire,
        }
    }
}
