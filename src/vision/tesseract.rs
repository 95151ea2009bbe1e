//! Tesseract OCR backend
//!
//! Runs the `tesseract` command line tool in TSV mode, which reports every
//! page, block, paragraph, line and word with its geometry and confidence.
//! Builds with the `tesseract` feature link the library instead; both share
//! [`parse_tsv`].

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use super::ocr::{OcrData, OcrEngine, OcrError};
use crate::config::OcrSettings;

/// Columns: level page_num block_num par_num line_num word_num left top width height conf text
const TSV_COLUMNS: usize = 12;

/// Tesseract engine driven through its CLI
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: String,
    language: String,
    tessdata_dir: Option<PathBuf>,
    page_segmentation_mode: Option<u8>,
}

impl TesseractCli {
    /// Create an engine for the given binary and language (e.g. "eng")
    pub fn new(program: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            language: language.into(),
            tessdata_dir: None,
            page_segmentation_mode: None,
        }
    }

    /// Create an engine from the `[ocr]` configuration section
    pub fn from_settings(settings: &OcrSettings) -> Self {
        info!(
            "Using tesseract at '{}' with language '{}'",
            settings.tesseract_path, settings.language
        );
        let mut engine = Self::new(&settings.tesseract_path, &settings.language);
        engine.tessdata_dir = settings.tessdata_dir.clone();
        match settings.page_segmentation_mode {
            Some(psm) => engine.with_page_segmentation_mode(psm),
            None => engine,
        }
    }

    /// Set the `--psm` page segmentation mode
    pub fn with_page_segmentation_mode(mut self, psm: u8) -> Self {
        self.page_segmentation_mode = Some(psm);
        self
    }

    fn command(&self, image: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(image).arg("stdout");
        if let Some(dir) = &self.tessdata_dir {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        cmd.arg("-l").arg(&self.language);
        if let Some(psm) = self.page_segmentation_mode {
            cmd.arg("--psm").arg(psm.to_string());
        }
        cmd.arg("tsv");
        cmd
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &Path) -> Result<OcrData, OcrError> {
        debug!("Tesseract: processing {}", image.display());

        let output = self
            .command(image)
            .output()
            .map_err(|source| OcrError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::EngineFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let tsv = String::from_utf8(output.stdout)
            .map_err(|e| OcrError::InvalidOutput(format!("output is not UTF-8: {e}")))?;

        let data = parse_tsv(&tsv)?;
        debug!("Tesseract: {} TSV rows", data.len());
        Ok(data)
    }
}

/// Parse Tesseract TSV output into parallel arrays.
///
/// Every row is kept regardless of level; structural rows carry a confidence
/// of -1 and empty text, so the confidence filter removes them later. The
/// CLI prints a header line and the library API does not.
pub fn parse_tsv(tsv: &str) -> Result<OcrData, OcrError> {
    let mut data = OcrData::default();
    for line in tsv.lines().filter(|line| !line.starts_with("level\t")) {
        let fields: Vec<&str> = line.splitn(TSV_COLUMNS, '\t').collect();
        if fields.len() < TSV_COLUMNS {
            continue;
        }

        let conf = fields[10].trim().parse::<f32>().unwrap_or(-1.0);
        let rect = (
            parse_coord(fields[6]),
            parse_coord(fields[7]),
            parse_coord(fields[8]),
            parse_coord(fields[9]),
        );
        data.push(fields[11], conf, rect);
    }

    Ok(data)
}

fn parse_coord(field: &str) -> i32 {
    field.trim().parse().unwrap_or(0)
}
