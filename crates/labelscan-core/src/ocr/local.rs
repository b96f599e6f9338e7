//! Offline recognizer using `pure-onnx-ocr`.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{join_reading_order, TextBox, TextRecognizer};

/// Recognizer running PaddleOCR ONNX models in-process.
pub struct LocalRecognizer {
    engine: Arc<Mutex<pure_onnx_ocr::engine::OcrEngine>>,
    keep_unk: bool,
}

impl LocalRecognizer {
    /// Load `det.onnx`, `latin_rec.onnx` and `latin_dict.txt` from `model_dir`.
    pub fn from_dir(model_dir: &Path, keep_unk: bool) -> Result<Self, OcrError> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("latin_rec.onnx");
        let dict_path = model_dir.join("latin_dict.txt");

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
            keep_unk,
        })
    }

    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        Self::from_dir(&config.model_dir, config.keep_unk)
    }
}

fn run_engine(
    engine: &Mutex<pure_onnx_ocr::engine::OcrEngine>,
    image: &DynamicImage,
    keep_unk: bool,
) -> Result<Vec<TextBox>, OcrError> {
    let engine = engine
        .lock()
        .map_err(|_| OcrError::Recognition("OCR engine lock poisoned".to_string()))?;

    let results = engine
        .run_from_image(image)
        .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

    Ok(results
        .iter()
        .map(|r| TextBox {
            bbox: polygon_to_bbox(&r.bounding_box),
            text: if keep_unk {
                r.text.clone()
            } else {
                r.text.replace("[UNK]", " ")
            },
            confidence: r.confidence,
        })
        .collect())
}

#[async_trait]
impl TextRecognizer for LocalRecognizer {
    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }

    async fn recognize(&self, image: &[u8]) -> Result<Option<String>, OcrError> {
        let image = image::load_from_memory(image)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;
        let (width, height) = image.dimensions();
        info!("Recognizing image locally: {}x{}", width, height);

        let engine = Arc::clone(&self.engine);
        let keep_unk = self.keep_unk;
        let start = Instant::now();

        let boxes = tokio::task::spawn_blocking(move || run_engine(&engine, &image, keep_unk))
            .await
            .map_err(|e| OcrError::Recognition(format!("OCR task failed: {}", e)))??;

        debug!(
            "pure-onnx-ocr returned {} text regions in {}ms",
            boxes.len(),
            start.elapsed().as_millis()
        );

        let text = join_reading_order(boxes);
        Ok(Some(text.trim().to_string()).filter(|t| !t.is_empty()))
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_models_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalRecognizer::from_dir(dir.path(), false).err().unwrap();

        assert!(matches!(err, OcrError::ModelLoad(ref m) if m.contains("det.onnx")));
    }
}
