//! Text recognition engines.
//!
//! The rest of the crate only sees [`TextRecognizer`]: image bytes in,
//! recognized text (or "no text found") out.

#[cfg(feature = "native")]
mod local;
mod vision;

#[cfg(feature = "native")]
pub use local::LocalRecognizer;
pub use vision::VisionRecognizer;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{OcrError, Result as LabelScanResult};
use crate::models::config::{OcrBackend, OcrConfig};

/// An image-to-text recognition capability.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Recognize the text in an encoded image.
    ///
    /// Returns `Ok(None)` when the engine found no text. `Some` is never empty.
    async fn recognize(&self, image: &[u8]) -> Result<Option<String>, OcrError>;
}

/// Build the recognizer selected by configuration.
pub fn create_recognizer(config: &OcrConfig) -> LabelScanResult<Arc<dyn TextRecognizer>> {
    match config.backend {
        OcrBackend::Vision => Ok(Arc::new(VisionRecognizer::from_config(config)?)),
        #[cfg(feature = "native")]
        OcrBackend::Local => Ok(Arc::new(LocalRecognizer::from_config(config)?)),
        #[cfg(not(feature = "native"))]
        OcrBackend::Local => Err(OcrError::ModelLoad(
            "local OCR requires the `native` feature".to_string(),
        )
        .into()),
    }
}

/// A recognized text region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Sort boxes top-to-bottom, left-to-right and join them with newlines.
///
/// Boxes whose tops fall within the same 20px band count as one row.
pub fn join_reading_order(mut boxes: Vec<TextBox>) -> String {
    boxes.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();
        let row_a = (ay / 20.0) as i32;
        let row_b = (by / 20.0) as i32;
        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        }
    });

    boxes
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        TextBox {
            bbox: [x, y, x + 50.0, y, x + 50.0, y + 10.0, x, y + 10.0],
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_join_reading_order() {
        let boxes = vec![
            text_box(10.0, 45.0, "Serial: ABC123"),
            text_box(120.0, 3.0, "Windows 10"),
            text_box(10.0, 5.0, "OS:"),
        ];

        assert_eq!(join_reading_order(boxes), "OS:\nWindows 10\nSerial: ABC123");
    }

    #[test]
    fn test_factory_reports_ocr_error() {
        let err = create_recognizer(&OcrConfig::default()).err().unwrap();

        assert!(matches!(
            err,
            crate::LabelScanError::Ocr(OcrError::ModelLoad(_))
        ));
        assert!(err.to_string().starts_with("OCR error: failed to load model"));
    }

    #[test]
    fn test_rect() {
        let (min_x, min_y, max_x, max_y) = text_box(10.0, 20.0, "x").rect();
        assert_eq!((min_x, min_y, max_x, max_y), (10.0, 20.0, 60.0, 30.0));
    }
}
