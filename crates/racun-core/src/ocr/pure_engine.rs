//! Native recognizer using `pure-onnx-ocr` (PaddleOCR models, no external runtime).

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{OcrConfig, RacunConfig};

use super::{LanguageProfile, ProgressEvent, Recognition, RecognitionAdapter, RECOGNIZING_TEXT};

const LOADING_IMAGE: &str = "loading image";
const UNKNOWN_TOKEN: &str = "[UNK]";

/// Boxes whose top edges fall in the same band belong to one line.
const ROW_HEIGHT: f32 = 20.0;

/// Recognition adapter backed by a local PaddleOCR engine.
///
/// The models cover Latin script; the language profile is only logged.
pub struct PureOcrAdapter {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unk: bool,
}

impl PureOcrAdapter {
    /// Load the models named in `config` from `model_dir`.
    pub fn from_dir(model_dir: &Path, config: &OcrConfig) -> Result<Self, OcrError> {
        let det_path = model_dir.join(&config.detection_model);
        let rec_path = model_dir.join(&config.recognition_model);
        let dict_path = model_dir.join(&config.dictionary);

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
            engine,
            keep_unk: config.keep_unk,
        })
    }

    /// Load the models from the configured model directory.
    pub fn from_config(config: &RacunConfig) -> Result<Self, OcrError> {
        Self::from_dir(&config.ocr.model_dir, &config.ocr)
    }

    /// Read all text boxes of a decoded image, joined in reading order.
    pub fn read_image(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let (width, height) = image.dimensions();
        debug!("Processing image: {}x{}", width, height);

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let boxes = results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: clean_text(&r.text, self.keep_unk),
            })
            .collect();

        Ok(join_in_reading_order(boxes))
    }
}

impl RecognitionAdapter for PureOcrAdapter {
    async fn recognize(
        &self,
        image: &[u8],
        profile: &LanguageProfile,
        progress: &mut dyn FnMut(ProgressEvent),
    ) -> Result<Recognition, OcrError> {
        let start = Instant::now();

        progress(ProgressEvent::new(LOADING_IMAGE, 0.0));
        let decoded =
            image::load_from_memory(image).map_err(|e| OcrError::InvalidImage(e.to_string()))?;
        progress(ProgressEvent::new(LOADING_IMAGE, 1.0));

        debug!("Recognizing with profile {}", profile);
        progress(ProgressEvent::new(RECOGNIZING_TEXT, 0.0));
        let text = self.read_image(&decoded)?;
        progress(ProgressEvent::new(RECOGNIZING_TEXT, 1.0));

        Ok(Recognition {
            text,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// A recognized text region.
#[derive(Debug, Clone)]
struct TextBox {
    /// Quadrilateral corners `[x1, y1, x2, y2, x3, y3, x4, y4]`.
    bbox: [f32; 8],
    text: String,
}

impl TextBox {
    /// Top-left corner of the axis-aligned bounding rectangle.
    fn origin(&self) -> (f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];
        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        (min_x, min_y)
    }
}

/// Sort boxes top-to-bottom then left-to-right and join them with newlines.
fn join_in_reading_order(mut boxes: Vec<TextBox>) -> String {
    boxes.sort_by(|a, b| {
        let (ax, ay) = a.origin();
        let (bx, by) = b.origin();
        let row_a = (ay / ROW_HEIGHT) as i32;
        let row_b = (by / ROW_HEIGHT) as i32;
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

fn clean_text(text: &str, keep_unk: bool) -> String {
    if keep_unk {
        text.to_string()
    } else {
        text.replace(UNKNOWN_TOKEN, " ")
    }
}

/// Take the first four exterior points of a polygon as a quadrilateral.
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

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        TextBox {
            bbox: [x, y, x + 50.0, y, x + 50.0, y + 12.0, x, y + 12.0],
            text: text.to_string(),
        }
    }

    #[test]
    fn test_reading_order() {
        let boxes = vec![
            text_box(200.0, 42.0, "8.831,23"),
            text_box(10.0, 5.0, "ALFA DOO"),
            text_box(10.0, 45.0, "Iznos za plaćanje:"),
            text_box(300.0, 3.0, "PIB: 101234567"),
        ];
        assert_eq!(
            join_in_reading_order(boxes),
            "ALFA DOO\nPIB: 101234567\nIznos za plaćanje:\n8.831,23"
        );
    }

    #[test]
    fn test_unknown_tokens() {
        assert_eq!(clean_text("Ra[UNK]un", false), "Ra un");
        assert_eq!(clean_text("Ra[UNK]un", true), "Ra[UNK]un");
    }

    #[test]
    fn test_missing_models() {
        let dir = std::env::temp_dir().join("racun-no-models");
        let result = PureOcrAdapter::from_dir(&dir, &OcrConfig::default());
        assert!(matches!(result, Err(OcrError::ModelLoad(_))));
    }
}
