//! HTTP Presentation
//!
//! Routes and handlers for the REST surface.

pub mod handlers;
pub mod routes;
