//! WebSocket Endpoint
//!
//! Producers stream frames in; admins join the broadcast audience and
//! receive annotated frames and alerts.

pub mod handler;
pub mod messages;

pub use handler::{serve_connection, ws_handler};
pub use messages::{ClientEvent, ClientMessage};
