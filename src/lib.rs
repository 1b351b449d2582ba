//! # Detection Relay Library
//!
//! Real-time object-detection relay:
//! - Producers stream camera frames over WebSocket
//! - Each frame is rate-limited, run through a detector and annotated
//! - Sustained detections raise alerts with a per-session cooldown
//! - Annotated frames and alerts are fanned out to an admin audience
//!
//! ## Architecture
//!
//! - **Domain Layer**: Sessions, detection window, rate gate, alert policy and the oracle/notifier traits
//! - **Application Layer**: Session registry, broadcast relay, alert dispatch, frame pipeline and DTOs
//! - **Infrastructure Layer**: Remote detector client, annotation, notifiers, metrics
//! - **Presentation Layer**: HTTP handlers and the WebSocket endpoint
//!
//! ## Module Structure
//!
//! ```text
//! detection_relay/
//! +-- config/         Configuration management
//! +-- domain/         Entities, pure rules and seams
//! +-- application/    Services and DTOs
//! +-- infrastructure/ Detector, notifiers, metrics
//! +-- presentation/   HTTP routes and WebSocket handler
//! +-- shared/         Errors and frame codec
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
