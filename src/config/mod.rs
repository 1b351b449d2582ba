//! # Configuration Module
//!
//! This module handles application configuration loading and management.
//! Configuration can be loaded from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{environment}.toml)
//! - .env files (via dotenvy)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use detection_relay::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("Alert after {} frames", settings.detection.alert_consecutive_frames);
//! ```

mod settings;

pub use settings::*;
