//! Application Layer
//!
//! Contains the detection pipeline services and data transfer objects (DTOs).
//! This layer orchestrates the flow of frames between the presentation
//! and domain layers.

pub mod services;
pub mod dto;
