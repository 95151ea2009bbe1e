//! Application Configuration
//!
//! Extraction thresholds, lexicon data and service settings stored in TOML format.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::patterns::{DEFAULT_IGNORE_PHRASES, DEFAULT_NOISE_KEYWORDS};

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// OCR engine settings
    pub ocr: OcrSettings,
    /// Row grouping settings
    pub layout: LayoutSettings,
    /// Noise keywords and ignored phrases
    pub lexicon: LexiconSettings,
    /// Database settings
    pub storage: StorageSettings,
    /// Upload service settings
    pub server: ServerSettings,
    /// Folder processing settings
    pub batch: BatchSettings,
}

/// OCR engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Path or name of the tesseract binary (command line engine)
    pub tesseract_path: String,
    /// Directory holding `<lang>.traineddata`; the Tesseract default when unset
    pub tessdata_dir: Option<PathBuf>,
    /// Tesseract language code(s), e.g. "eng" or "eng+hin"
    pub language: String,
    /// Words at or below this confidence (0.0 - 1.0) are discarded
    pub confidence_threshold: f32,
    /// Tesseract page segmentation mode (`--psm`)
    pub page_segmentation_mode: Option<u8>,
    /// Image preprocessing applied before OCR
    pub preprocessing: OcrPreprocessing,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            tesseract_path: "tesseract".to_string(),
            tessdata_dir: None,
            language: "eng".to_string(),
            confidence_threshold: 0.6,
            page_segmentation_mode: None,
            preprocessing: OcrPreprocessing::default(),
        }
    }
}

/// Image preprocessing filters for photographed menus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrPreprocessing {
    /// Master switch; nothing below applies when false
    pub enabled: bool,
    /// Convert to grayscale
    pub grayscale: bool,
    /// Invert colors (light text on dark boards)
    pub invert: bool,
    /// Contrast factor around mid-gray (1.0 = unchanged)
    pub contrast: f32,
    /// Integer upscale factor (1 = unchanged)
    pub scale: u32,
}

impl Default for OcrPreprocessing {
    fn default() -> Self {
        Self {
            enabled: false,
            grayscale: true,
            invert: false,
            contrast: 1.0,
            scale: 1,
        }
    }
}

/// Row grouping settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Maximum vertical centroid distance (pixels) between consecutive words of a line
    pub y_threshold: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self { y_threshold: 15.0 }
    }
}

/// Lexicon data used by the item filter and the entry filter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconSettings {
    /// Normalized words never accepted as item names
    pub noise_keywords: Vec<String>,
    /// Phrases marking an entry as non-menu content (batch path only)
    pub ignore_phrases: Vec<String>,
}

impl Default for LexiconSettings {
    fn default() -> Self {
        Self {
            noise_keywords: DEFAULT_NOISE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            ignore_phrases: DEFAULT_IGNORE_PHRASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// SQLite database file; defaults to `menu.db` in the data directory
    pub database_path: Option<PathBuf>,
}

/// Upload service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address the upload service listens on
    pub bind_address: String,
    /// Maximum accepted request body in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Folder processing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Image file extensions picked up from a folder (case-insensitive)
    pub extensions: Vec<String>,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            extensions: ["jpg", "jpeg", "png", "bmp", "tiff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
