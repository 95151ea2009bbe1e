//! Vision/OCR Layer
//!
//! Turns an image into positioned word tokens. The OCR engine is pluggable
//! through [`OcrEngine`]. The Tesseract CLI is the default backend; the
//! `tesseract` feature links the library instead.

#[cfg(feature = "tesseract")]
pub mod libtesseract;
pub mod ocr;
pub mod preprocess;
pub mod tesseract;

pub use ocr::{OcrData, OcrEngine, OcrError};
#[cfg(test)]
pub use ocr::StaticOcrEngine;
pub use preprocess::apply_preprocessing;
#[cfg(feature = "tesseract")]
pub use libtesseract::LibTesseract;
pub use tesseract::TesseractCli;

use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{OcrPreprocessing, OcrSettings};

/// A point in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One recognized word with its geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Trimmed word text
    pub text: String,
    /// Recognition confidence (0.0 - 1.0)
    pub confidence: f32,
    /// Corners clockwise from top-left
    pub quad: [Point; 4],
    /// Center of the bounding rectangle
    pub centroid: Point,
    /// Section label, set once by the category assigner
    pub category: Option<String>,
}

impl Token {
    /// Build a token from a left/top/width/height rectangle
    pub fn from_rect(text: impl Into<String>, confidence: f32, left: f64, top: f64, width: f64, height: f64) -> Self {
        let right = left + width;
        let bottom = top + height;
        Self {
            text: text.into(),
            confidence,
            quad: [
                Point::new(left, top),
                Point::new(right, top),
                Point::new(right, bottom),
                Point::new(left, bottom),
            ],
            centroid: Point::new(left + width / 2.0, top + height / 2.0),
            category: None,
        }
    }
}

/// Convert raw OCR output into tokens.
///
/// Keeps an entry iff its confidence exceeds `confidence_threshold * 100`
/// and its trimmed text is non-empty. Geometry is divided by `scale` to undo
/// any upscaling done before recognition. Columns of unequal length are
/// rejected as invalid engine output.
pub fn tokens_from_ocr(data: &OcrData, confidence_threshold: f32, scale: u32) -> Result<Vec<Token>, OcrError> {
    data.validate()?;
    let min_conf = confidence_threshold * 100.0;
    let scale = f64::from(scale.max(1));

    let tokens = (0..data.len())
        .filter_map(|i| {
            let conf = data.conf[i];
            let text = data.text[i].trim();
            if conf <= min_conf || text.is_empty() {
                return None;
            }
            Some(Token::from_rect(
                text,
                conf / 100.0,
                f64::from(data.left[i]) / scale,
                f64::from(data.top[i]) / scale,
                f64::from(data.width[i]) / scale,
                f64::from(data.height[i]) / scale,
            ))
        })
        .collect();
    Ok(tokens)
}

/// Runs the OCR engine on an image and filters its words into tokens
pub struct BoxExtractor {
    engine: Box<dyn OcrEngine>,
    confidence_threshold: f32,
    preprocessing: OcrPreprocessing,
}

impl BoxExtractor {
    /// Create an extractor using the `[ocr]` configuration section
    pub fn with_settings(engine: Box<dyn OcrEngine>, settings: &OcrSettings) -> Self {
        Self {
            engine,
            confidence_threshold: settings.confidence_threshold,
            preprocessing: settings.preprocessing.clone(),
        }
    }

    /// Recognize the image at `path` and return its confident words.
    ///
    /// The image is decoded first so unreadable files fail before the engine
    /// runs. Any failure is fatal for this image.
    pub fn extract(&self, path: &Path) -> Result<Vec<Token>, OcrError> {
        let start = Instant::now();
        let image = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?;

        let (data, scale) = if self.preprocessing.enabled {
            let processed = apply_preprocessing(image, &self.preprocessing);
            let temp = tempfile::Builder::new()
                .prefix("menu-ocr-")
                .suffix(".png")
                .tempfile()?;
            processed
                .image
                .save_with_format(temp.path(), image::ImageFormat::Png)?;
            (self.engine.recognize(temp.path())?, processed.scale)
        } else {
            (self.engine.recognize(path)?, 1)
        };

        if data.is_empty() {
            warn!("OCR found no text in {}", path.display());
        }
        let tokens = tokens_from_ocr(&data, self.confidence_threshold, scale)?;

        debug!(
            "OCR of {} returned {} entries in {:?}",
            path.display(),
            data.len(),
            start.elapsed()
        );
        info!("Extracted {} tokens from {}", tokens.len(), path.display());

        Ok(tokens)
    }
}
