//! Application settings and configuration structures.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Detector, rate gate and alert thresholds
    pub detection: DetectionSettings,

    /// Alert notification sink
    pub notifier: NotifierSettings,

    /// Broadcast relay tuning
    pub relay: RelaySettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// WebSocket configuration
    pub websocket: WebSocketSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// Detection pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionSettings {
    /// Base URL of the remote inference service
    pub detector_url: String,

    /// Per-request timeout for the inference service in seconds
    pub request_timeout_secs: u64,

    /// Detections below this confidence are discarded
    pub confidence_threshold: f32,

    /// Frames processed per second per session
    pub frame_rate: f64,

    /// Detection window size and alert threshold
    pub alert_consecutive_frames: usize,

    /// Minimum seconds between two alerts for the same session
    pub alert_cooldown_secs: u64,

    /// JPEG quality of the annotated frame (1-100)
    pub jpeg_quality: u8,

    /// Frames a connection may queue behind the one being detected
    pub pending_frames: usize,
}

/// Alert notifier configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NotifierSettings {
    /// Alert recipient
    pub admin_email: String,

    /// Alert sender address
    pub sender: String,

    /// Optional webhook endpoint; alerts are only logged when unset
    pub webhook_url: Option<String>,

    /// Pending alerts held before new ones are dropped
    pub queue_capacity: usize,
}

/// Broadcast relay configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RelaySettings {
    /// Per-subscriber buffer; events beyond it are dropped for that subscriber
    pub subscriber_buffer: usize,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (empty allows any origin)
    pub allowed_origins: Vec<String>,
}

/// WebSocket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketSettings {
    /// Maximum message size in bytes (default: 8MB, frames are base64 images)
    pub max_message_size: usize,

    /// Maximum frame size in bytes (default: 8MB)
    pub max_frame_size: usize,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if a detection parameter is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("detection.detector_url", "http://127.0.0.1:8000")?
            .set_default("detection.request_timeout_secs", 10)?
            .set_default("detection.confidence_threshold", 0.1)?
            .set_default("detection.frame_rate", 1.0)?
            .set_default("detection.alert_consecutive_frames", 5)?
            .set_default("detection.alert_cooldown_secs", 60)?
            .set_default("detection.jpeg_quality", 85)?
            .set_default("detection.pending_frames", 4)?
            .set_default("notifier.admin_email", "admin@example.com")?
            .set_default("notifier.sender", "alerts@example.com")?
            .set_default("notifier.queue_capacity", 64)?
            .set_default("relay.subscriber_buffer", 16)?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("websocket.max_message_size", 8_388_608_i64)? // 8MB
            .set_default("websocket.max_frame_size", 8_388_608_i64)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__DETECTION__FRAME_RATE=2 -> detection.frame_rate = 2
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("detection.detector_url", std::env::var("DETECTOR_URL").ok())?
            .set_override_option("notifier.admin_email", std::env::var("ADMIN_EMAIL").ok())?
            .set_override_option("notifier.sender", std::env::var("ALERT_SENDER").ok())?
            .set_override_option(
                "notifier.webhook_url",
                std::env::var("ALERT_WEBHOOK_URL").ok(),
            )?
            .build()?
            .try_deserialize()
            .and_then(|settings: Self| {
                settings.detection.validate()?;
                Ok(settings)
            })
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl DetectionSettings {
    /// Reject parameter combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.frame_rate > 0.0) {
            return Err(ConfigError::Message(format!(
                "detection.frame_rate must be positive, got {}",
                self.frame_rate
            )));
        }
        if self.alert_consecutive_frames == 0 {
            return Err(ConfigError::Message(
                "detection.alert_consecutive_frames must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Message(format!(
                "detection.confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.pending_frames == 0 {
            return Err(ConfigError::Message(
                "detection.pending_frames must be at least 1".into(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Message(format!(
                "detection.jpeg_quality must be within [1, 100], got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }

    /// Minimum spacing between two processed frames of one session.
    /// Non-positive rates admit every frame.
    pub fn frame_interval(&self) -> Duration {
        if self.frame_rate > 0.0 {
            Duration::from_secs_f64(1.0 / self.frame_rate)
        } else {
            Duration::ZERO
        }
    }

    pub fn alert_cooldown(&self) -> Duration {
        Duration::from_secs(self.alert_cooldown_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            detector_url: "http://127.0.0.1:8000".into(),
            request_timeout_secs: 10,
            confidence_threshold: 0.1,
            frame_rate: 1.0,
            alert_consecutive_frames: 5,
            alert_cooldown_secs: 60,
            jpeg_quality: 85,
            pending_frames: 4,
        }
    }
}
