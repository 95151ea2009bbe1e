//! Linked Tesseract backend
//!
//! Calls libtesseract through `leptess` and reads the same word-level TSV the
//! command line tool prints. Only built with the `tesseract` feature.

use leptess::{LepTess, Variable};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use super::ocr::{OcrData, OcrEngine, OcrError};
use super::tesseract::parse_tsv;
use crate::config::OcrSettings;

/// Tesseract engine using the linked library
#[derive(Debug, Clone)]
pub struct LibTesseract {
    tessdata_dir: Option<String>,
    language: String,
    page_segmentation_mode: Option<u8>,
}

impl LibTesseract {
    /// Create an engine from the `[ocr]` section.
    ///
    /// Fails early when the language data cannot be loaded.
    pub fn from_settings(settings: &OcrSettings) -> Result<Self, OcrError> {
        let tessdata_dir = settings
            .tessdata_dir
            .as_deref()
            .map(tessdata_str)
            .transpose()?;
        let engine = Self {
            tessdata_dir,
            language: settings.language.clone(),
            page_segmentation_mode: settings.page_segmentation_mode,
        };
        engine.init()?;
        info!("Using linked Tesseract with language '{}'", engine.language);
        Ok(engine)
    }

    /// A fresh Tesseract handle; handles are not shared between threads
    fn init(&self) -> Result<LepTess, OcrError> {
        let mut lt = LepTess::new(self.tessdata_dir.as_deref(), &self.language).map_err(|e| {
            OcrError::Init(format!("language '{}': {e:?}", self.language))
        })?;

        if let Some(psm) = self.page_segmentation_mode {
            lt.set_variable(Variable::TesseditPagesegMode, &psm.to_string())
                .map_err(|e| OcrError::Init(format!("page segmentation mode {psm}: {e:?}")))?;
        }
        Ok(lt)
    }
}

fn tessdata_str(dir: &Path) -> Result<String, OcrError> {
    dir.to_str()
        .map(str::to_string)
        .ok_or_else(|| OcrError::Init(format!("tessdata path is not UTF-8: {}", dir.display())))
}

impl OcrEngine for LibTesseract {
    fn recognize(&self, image: &Path) -> Result<OcrData, OcrError> {
        let start = Instant::now();
        let bytes = std::fs::read(image)?;

        let mut lt = self.init()?;
        lt.set_image_from_mem(&bytes)
            .map_err(|e| OcrError::Recognition(format!("{}: {e:?}", image.display())))?;
        let tsv = lt
            .get_tsv_text(0)
            .map_err(|e| OcrError::Recognition(format!("{}: {e:?}", image.display())))?;

        let data = parse_tsv(&tsv)?;
        debug!(
            "Tesseract: {} TSV rows from {} in {:?}",
            data.len(),
            image.display(),
            start.elapsed()
        );
        Ok(data)
    }
}
