//! OCR engine boundary
//!
//! Any engine that reports per-word text, a 0-100 confidence and a
//! left/top/width/height rectangle can drive the extraction pipeline.

use std::path::Path;
use thiserror::Error;

/// Errors raised while running an OCR engine on one image
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine binary could not be launched
    #[error("failed to launch OCR engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The engine ran but reported failure
    #[error("OCR engine exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },
    /// The OCR library could not be initialized for the configured language
    #[cfg(feature = "tesseract")]
    #[error("failed to initialize Tesseract: {0}")]
    Init(String),
    /// The OCR library failed while recognizing the image
    #[cfg(feature = "tesseract")]
    #[error("Tesseract recognition failed: {0}")]
    Recognition(String),
    /// The engine output could not be understood
    #[error("invalid OCR output: {0}")]
    InvalidOutput(String),
    /// The image could not be opened or decoded
    #[error("unreadable image: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Raw engine output as parallel arrays indexed by detected token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrData {
    pub text: Vec<String>,
    /// Confidence on a 0-100 scale, -1 when the engine assigns none
    pub conf: Vec<f32>,
    pub left: Vec<i32>,
    pub top: Vec<i32>,
    pub width: Vec<i32>,
    pub height: Vec<i32>,
}

impl OcrData {
    /// Number of detected entries
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Check that every column has one value per detected entry
    pub fn validate(&self) -> Result<(), OcrError> {
        let expected = self.text.len();
        let columns = [
            ("conf", self.conf.len()),
            ("left", self.left.len()),
            ("top", self.top.len()),
            ("width", self.width.len()),
            ("height", self.height.len()),
        ];
        for (name, len) in columns {
            if len != expected {
                return Err(OcrError::InvalidOutput(format!(
                    "{name} has {len} values for {expected} words"
                )));
            }
        }
        Ok(())
    }

    /// Append one detected entry
    pub fn push(&mut self, text: impl Into<String>, conf: f32, rect: (i32, i32, i32, i32)) {
        self.text.push(text.into());
        self.conf.push(conf);
        self.left.push(rect.0);
        self.top.push(rect.1);
        self.width.push(rect.2);
        self.height.push(rect.3);
    }
}

/// An OCR engine invoked once per image
pub trait OcrEngine: Send + Sync {
    /// Recognize words in the image at `image`
    fn recognize(&self, image: &Path) -> Result<OcrData, OcrError>;
}

/// Engine returning canned data, for running the pipeline without an OCR install
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct StaticOcrEngine {
    data: OcrData,
}

#[cfg(test)]
impl StaticOcrEngine {
    pub fn new(data: OcrData) -> Self {
        Self { data }
    }
}

#[cfg(test)]
impl OcrEngine for StaticOcrEngine {
    fn recognize(&self, _image: &Path) -> Result<OcrData, OcrError> {
        Ok(self.data.clone())
    }
}
