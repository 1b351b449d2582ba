//! Presentation Layer
//!
//! HTTP routes and the WebSocket endpoint.

pub mod http;
pub mod websocket;
pub mod middleware;
