//! HTTP Detector Client
//!
//! Talks to a remote inference service:
//! - `GET  {base_url}/health` must succeed before the detector is considered loaded
//! - `POST {base_url}/v1/detect` with a multipart `image` part returns
//!   `{"detections": [{"x1", "y1", "x2", "y2", "confidence", "class_id"}]}`

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::DetectorBackend;
use crate::config::DetectionSettings;
use crate::domain::Detection;
use crate::shared::error::DetectionError;

/// Remote detector client
pub struct HttpDetector {
    client: reqwest::Client,
    base_url: String,
}

/// Detection response body
#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    detections: Vec<RawDetection>,
}

/// Box as reported by the inference service (float pixel coordinates)
#[derive(Debug, Deserialize)]
struct RawDetection {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    confidence: f32,
    #[serde(default)]
    class_id: u32,
}

impl From<RawDetection> for Detection {
    fn from(raw: RawDetection) -> Self {
        // Truncate towards zero, like an integer cast of the model output.
        Self {
            x1: raw.x1 as i32,
            y1: raw.y1 as i32,
            x2: raw.x2 as i32,
            y2: raw.y2 as i32,
            confidence: raw.confidence,
            class_id: raw.class_id,
        }
    }
}

impl HttpDetector {
    /// Build the client and verify the service answers its health check.
    pub async fn connect(settings: &DetectionSettings) -> Result<Self, DetectionError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| DetectionError::Backend(format!("failed to build HTTP client: {}", e)))?;

        let detector = Self {
            client,
            base_url: settings.detector_url.trim_end_matches('/').to_string(),
        };
        detector.health_check().await?;
        Ok(detector)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check the inference service is up.
    pub async fn health_check(&self) -> Result<(), DetectionError> {
        let url = format!("{}/health", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DetectionError::Backend(format!("detector unreachable: {}", e)))?;

        if !resp.status().is_success() {
            return Err(DetectionError::Backend(format!(
                "detector health check returned {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DetectorBackend for HttpDetector {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn infer(&self, image: Vec<u8>) -> Result<Vec<Detection>, DetectionError> {
        let url = format!("{}/v1/detect", self.base_url);
        let form = Form::new().part("image", Part::bytes(image).file_name("frame"));

        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DetectionError::Backend(format!("detect request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DetectionError::Backend(format!(
                "detector returned {} - {}",
                status, body
            )));
        }

        let body: DetectResponse = resp
            .json()
            .await
            .map_err(|e| DetectionError::Backend(format!("invalid detector response: {}", e)))?;

        Ok(body.detections.into_iter().map(Detection::from).collect())
    }
}
