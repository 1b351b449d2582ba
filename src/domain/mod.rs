//! # Domain Layer
//!
//! The domain layer contains the core detection-session rules of the relay.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Sessions, detections, alerts and the traits that bound
//!   the external detector and notifier
//! - **services**: Pure rules (frame-rate gate, detection window, alert policy)
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - No I/O and no clock reads; callers pass `now` in
//! - External collaborators are reached only through traits

pub mod entities;
pub mod services;

// Re-export commonly used types
pub use entities::*;
pub use services::*;
