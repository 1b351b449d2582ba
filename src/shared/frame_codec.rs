//! Frame Payload Codec
//!
//! Conversions between the wire representation of a frame (a data URI or a
//! bare base64 string) and raw encoded image bytes.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::error::DetectionError;

/// Prefix marking a data URI carrying an image
const DATA_URI_IMAGE_PREFIX: &str = "data:image";

/// Strip an optional `data:image/...;base64,` header and decode the payload.
pub fn decode_frame_payload(payload: &str) -> Result<Vec<u8>, DetectionError> {
    let encoded = if payload.starts_with(DATA_URI_IMAGE_PREFIX) {
        payload
            .split_once(',')
            .map(|(_, body)| body)
            .ok_or_else(|| DetectionError::Decode("data URI without payload".into()))?
    } else {
        payload
    };

    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(DetectionError::Decode("empty frame payload".into()));
    }

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| DetectionError::Decode(format!("invalid base64: {}", e)))?;

    if bytes.is_empty() {
        return Err(DetectionError::Decode("empty frame payload".into()));
    }

    Ok(bytes)
}

/// Wrap JPEG bytes as a `data:image/jpeg;base64,` URI.
pub fn encode_jpeg_data_uri(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg))
}
