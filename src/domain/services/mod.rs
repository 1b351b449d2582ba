//! # Domain Services
//!
//! Pure rules applied to a session on every frame.
//!
//! ## Services
//!
//! - **IngestGate**: Per-session frame-rate limiter
//! - **DetectionWindow**: Sliding window of per-frame detection outcomes
//! - **AlertPolicy**: Threshold plus cooldown debounce

mod alert_policy;
mod detection_window;
mod ingest_gate;

pub use alert_policy::{AlertDecision, AlertPolicy};
pub use detection_window::DetectionWindow;
pub use ingest_gate::IngestGate;
