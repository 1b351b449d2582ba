//! Middleware
//!
//! Tower middleware for request processing.

pub mod cors;
pub mod logging;
