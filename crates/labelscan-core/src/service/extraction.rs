//! Extraction service: image in, fields out.

use std::sync::Arc;
use std::time::Instant;

use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::{error, info, warn};

use crate::extract::extract_fields;
use crate::models::label::{FieldSet, ScanRequest, NOT_AVAILABLE};
use crate::ocr::TextRecognizer;

use super::ServiceError;

const NO_IMAGE: &str = "No image provided.";
const BAD_IMAGE: &str = "Image payload is not valid base64.";
const NO_TEXT: &str = "No text detected in the image.";
const PROCESSING_FAILED: &str = "Error processing request";

/// Runs recognition and field extraction for one scan request.
pub struct ExtractionService {
    recognizer: Arc<dyn TextRecognizer>,
}

impl ExtractionService {
    pub fn new(recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Handle a scan request.
    pub async fn scan(&self, request: ScanRequest) -> Result<FieldSet, ServiceError> {
        let room = request.room_number.as_deref().unwrap_or(NOT_AVAILABLE);

        let Some(encoded) = request.image_base64.as_deref().filter(|s| !s.trim().is_empty())
        else {
            warn!(room, "Scan rejected: no image");
            return Err(ServiceError::validation(NO_IMAGE));
        };

        let image = decode_image(encoded).ok_or_else(|| {
            warn!(room, "Scan rejected: undecodable image payload");
            ServiceError::validation(BAD_IMAGE)
        })?;

        self.scan_bytes(&image, room).await
    }

    /// Recognize and extract from raw image bytes.
    pub async fn scan_bytes(&self, image: &[u8], room: &str) -> Result<FieldSet, ServiceError> {
        let start = Instant::now();
        info!(
            room,
            engine = self.recognizer.name(),
            bytes = image.len(),
            "Scanning label"
        );

        let text = self.recognizer.recognize(image).await.map_err(|e| {
            error!(room, "Recognition failed: {}", e);
            ServiceError::upstream(PROCESSING_FAILED, e)
        })?;

        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            warn!(room, "No text detected");
            return Err(ServiceError::validation(NO_TEXT));
        };

        let fields = extract_fields(&text);
        info!(
            room,
            found = fields.found_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Label scanned"
        );
        Ok(fields)
    }
}

/// Decode a base64 image, accepting an optional `data:<mime>;base64,` prefix.
fn decode_image(encoded: &str) -> Option<Vec<u8>> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact).ok()
}
