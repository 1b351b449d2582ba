//! Detection Oracle Adapter
//!
//! Wraps a raw detector backend and turns a wire-format frame into an
//! `OracleOutput`: decode, detect, confidence filter, annotate, re-encode.

mod annotate;
mod http_detector;

use std::sync::Arc;

use async_trait::async_trait;
use image::RgbImage;

use crate::config::DetectionSettings;
use crate::domain::{Detection, DetectionOracle, OracleOutput};
use crate::shared::error::DetectionError;
use crate::shared::frame_codec::{decode_frame_payload, encode_jpeg_data_uri};

use annotate::render;
pub use http_detector::HttpDetector;

/// Raw detector: encoded image in, unfiltered boxes out.
#[async_trait]
pub trait DetectorBackend: Send + Sync {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Run detection on an encoded image.
    async fn infer(&self, image: Vec<u8>) -> Result<Vec<Detection>, DetectionError>;
}

/// `DetectionOracle` over an optional backend.
///
/// A missing backend means initialization failed; every call then reports
/// `ModelUnavailable` and health reports degraded.
pub struct OracleAdapter {
    backend: Option<Arc<dyn DetectorBackend>>,
    confidence_threshold: f32,
    jpeg_quality: u8,
}

impl OracleAdapter {
    pub fn new(backend: Arc<dyn DetectorBackend>, settings: &DetectionSettings) -> Self {
        Self {
            backend: Some(backend),
            confidence_threshold: settings.confidence_threshold,
            jpeg_quality: settings.jpeg_quality,
        }
    }

    /// Adapter with no backend.
    pub fn unavailable(settings: &DetectionSettings) -> Self {
        Self {
            backend: None,
            confidence_threshold: settings.confidence_threshold,
            jpeg_quality: settings.jpeg_quality,
        }
    }

    /// Connect to the remote detector. Failure degrades to an unavailable
    /// adapter rather than aborting startup.
    pub async fn connect(settings: &DetectionSettings) -> Self {
        match HttpDetector::connect(settings).await {
            Ok(detector) => {
                tracing::info!(
                    backend = detector.name(),
                    detector_url = %detector.base_url(),
                    "Detector connected"
                );
                Self::new(Arc::new(detector), settings)
            }
            Err(e) => {
                tracing::error!(
                    detector_url = %settings.detector_url,
                    error = %e,
                    "Failed to initialize detector, running degraded"
                );
                Self::unavailable(settings)
            }
        }
    }

    fn filter(&self, detections: Vec<Detection>) -> Vec<Detection> {
        detections
            .into_iter()
            .filter(|d| d.confidence >= self.confidence_threshold)
            .collect()
    }
}

#[async_trait]
impl DetectionOracle for OracleAdapter {
    fn is_ready(&self) -> bool {
        self.backend.is_some()
    }

    async fn detect(&self, frame: &str) -> Result<OracleOutput, DetectionError> {
        let backend = self.backend.as_ref().ok_or(DetectionError::ModelUnavailable)?;

        let bytes = decode_frame_payload(frame)?;
        let (image, bytes) = tokio::task::spawn_blocking(move || decode_image(bytes))
            .await
            .map_err(|e| DetectionError::Backend(format!("decode task failed: {}", e)))??;

        let detections = self.filter(backend.infer(bytes).await?);

        let quality = self.jpeg_quality;
        let overlay = detections.clone();
        let jpeg = tokio::task::spawn_blocking(move || render(image, &overlay, quality))
            .await
            .map_err(|e| DetectionError::Backend(format!("annotate task failed: {}", e)))?
            .map_err(|e| DetectionError::Backend(format!("failed to encode annotated frame: {}", e)))?;

        Ok(OracleOutput {
            annotated_frame: encode_jpeg_data_uri(&jpeg),
            detections,
        })
    }
}

/// Decode to RGB, handing the original bytes back for the backend.
fn decode_image(bytes: Vec<u8>) -> Result<(RgbImage, Vec<u8>), DetectionError> {
    let image = image::load_from_memory(&bytes)
        .map_err(|e| DetectionError::Decode(format!("undecodable image: {}", e)))?
        .to_rgb8();
    if image.width() == 0 || image.height() == 0 {
        return Err(DetectionError::Decode("image has no pixels".into()));
    }
    Ok((image, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use image::codecs::jpeg::JpegEncoder;

    struct FixedBackend(Vec<Detection>);

    #[async_trait]
    impl DetectorBackend for FixedBackend {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn infer(&self, _image: Vec<u8>) -> Result<Vec<Detection>, DetectionError> {
            Ok(self.0.clone())
        }
    }

    fn detection(confidence: f32) -> Detection {
        Detection {
            x1: 2,
            y1: 2,
            x2: 10,
            y2: 10,
            confidence,
            class_id: 0,
        }
    }

    fn jpeg_data_uri(width: u32, height: u32) -> String {
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, 90)
            .encode_image(&RgbImage::new(width, height))
            .unwrap();
        format!("data:image/jpeg;base64,{}", STANDARD.encode(&buffer))
    }

    fn adapter(detections: Vec<Detection>) -> OracleAdapter {
        OracleAdapter::new(Arc::new(FixedBackend(detections)), &DetectionSettings::default())
    }

    #[tokio::test]
    async fn test_filters_below_threshold() {
        let oracle = adapter(vec![detection(0.05), detection(0.1), detection(0.9)]);
        let output = oracle.detect(&jpeg_data_uri(16, 16)).await.unwrap();

        assert_eq!(output.detections.len(), 2);
        assert!(output.detections.iter().all(|d| d.confidence >= 0.1));
        assert!(output.annotated_frame.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_no_detections_still_annotates() {
        let oracle = adapter(vec![]);
        let output = oracle.detect(&jpeg_data_uri(8, 8)).await.unwrap();
        assert!(!output.has_detection());
        assert!(!output.annotated_frame.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_payloads_are_decode_errors() {
        let oracle = adapter(vec![detection(0.9)]);
        for payload in ["", "%%%", "data:image/jpeg;base64,AQIDBA=="] {
            let err = oracle.detect(payload).await.unwrap_err();
            assert!(matches!(err, DetectionError::Decode(_)), "payload {:?}", payload);
        }
    }

    #[tokio::test]
    async fn test_unavailable_without_backend() {
        let oracle = OracleAdapter::unavailable(&DetectionSettings::default());
        assert!(!oracle.is_ready());
        let err = oracle.detect(&jpeg_data_uri(8, 8)).await.unwrap_err();
        assert!(matches!(err, DetectionError::ModelUnavailable));
    }
}
