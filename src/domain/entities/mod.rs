//! # Domain Entities
//!
//! - **Session**: Per-producer streaming state, owning its detection window
//!   and alert cooldown
//! - **Detection**: A bounding box reported by the detector
//! - **Alert**: A sustained-detection alert
//!
//! ## Boundary Traits
//!
//! `DetectionOracle` and `AlertNotifier` are implemented in the
//! infrastructure layer, following the dependency inversion principle.

mod alert;
mod detection;
mod session;

pub use alert::{Alert, AlertNotifier};
pub use detection::{Detection, DetectionOracle, OracleOutput};
pub use session::{FrameUpdate, Session, SessionPhase};

#[cfg(test)]
pub use alert::MockAlertNotifier;
