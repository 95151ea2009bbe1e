//! Extraction Coordinator
//!
//! Runs the full image-to-entries pipeline. The upload service and folder
//! processing both go through [`MenuExtractor`]; each call starts from fresh
//! category and entry state, so one extractor can serve many images.

use std::path::Path;
use tracing::info;

use crate::analysis::{group_rows, CategoryAssigner, Lexicon, MenuEntry, MenuParser};
use crate::config::AppConfig;
use crate::vision::{BoxExtractor, OcrEngine, OcrError, Token};

/// Image-to-menu pipeline
pub struct MenuExtractor {
    boxes: BoxExtractor,
    y_threshold: f64,
    lexicon: Lexicon,
}

impl MenuExtractor {
    /// Build the pipeline from configuration and an OCR engine
    pub fn new(config: &AppConfig, engine: Box<dyn OcrEngine>) -> Self {
        Self {
            boxes: BoxExtractor::with_settings(engine, &config.ocr),
            y_threshold: config.layout.y_threshold,
            lexicon: Lexicon::from_settings(&config.lexicon),
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Run OCR on one image and parse its menu entries.
    ///
    /// `image_name` is recorded on every entry. An OCR failure aborts this
    /// image with no partial result.
    pub fn process_image(&self, path: &Path, image_name: &str) -> Result<Vec<MenuEntry>, OcrError> {
        let tokens = self.boxes.extract(path)?;
        let entries = self.process_tokens(tokens, image_name);
        info!("{}: {} menu entries", image_name, entries.len());
        Ok(entries)
    }

    /// Parse menu entries from already recognized tokens
    pub fn process_tokens(&self, tokens: Vec<Token>, image_name: &str) -> Vec<MenuEntry> {
        let rows = group_rows(tokens, self.y_threshold);
        let content = CategoryAssigner::assign(rows);
        MenuParser::parse(&content, image_name, &self.lexicon)
    }
}
