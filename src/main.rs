//! # Detection Relay
//!
//! Real-time object-detection relay server.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Detector connection
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use detection_relay::config::Settings;
use detection_relay::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    detection_relay::telemetry::init_tracing();

    info!("Starting Detection Relay...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        detector_url = %settings.detection.detector_url,
        frame_rate = settings.detection.frame_rate,
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
