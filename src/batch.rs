//! Folder processing
//!
//! Runs the extraction pipeline over every image in a directory, drops
//! non-menu entries and renders the result as a table.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::analysis::{filter_entries, MenuEntry};
use crate::app::MenuExtractor;

/// Outcome of processing a folder
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Filtered entries from all images, in file name order
    pub entries: Vec<MenuEntry>,
    /// Number of images processed successfully
    pub processed: usize,
    /// Images whose OCR failed, with the error message
    pub failures: Vec<(PathBuf, String)>,
}

/// Whether the file name has one of the accepted extensions (case-insensitive)
pub fn has_image_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|accepted| accepted.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Image files of a folder, sorted by name
pub fn list_images(folder: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for dir_entry in std::fs::read_dir(folder)
        .with_context(|| format!("Failed to read folder {}", folder.display()))?
    {
        let path = dir_entry?.path();
        if path.is_file() && has_image_extension(&path, extensions) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// Extract and filter entries from every image in `folder`.
///
/// An image whose OCR fails is logged and skipped; the others are still processed.
pub fn process_folder(extractor: &MenuExtractor, folder: &Path, extensions: &[String]) -> Result<BatchReport> {
    let mut report = BatchReport::default();

    for path in list_images(folder, extensions)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("Processing {} ...", name);

        match extractor.process_image(&path, &name) {
            Ok(entries) => {
                report.processed += 1;
                report.entries.extend(filter_entries(entries, extractor.lexicon()));
            }
            Err(e) => {
                error!("Failed to process {}: {}", name, e);
                report.failures.push((path, e.to_string()));
            }
        }
    }

    if report.processed == 0 && report.failures.is_empty() {
        warn!("No images found in {}", folder.display());
    }

    Ok(report)
}

const TABLE_HEADERS: [&str; 5] = ["image", "category", "item", "price", "description"];

/// Render entries as a grid table
pub fn render_table(entries: &[MenuEntry]) -> String {
    let rows: Vec<[&str; 5]> = entries
        .iter()
        .map(|e| {
            [
                e.image.as_str(),
                e.category.as_str(),
                e.item.as_str(),
                e.price.as_str(),
                e.description.trim(),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator = |fill: char| {
        let mut line = String::from("+");
        for width in &widths {
            line.extend(std::iter::repeat(fill).take(width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };
    let format_row = |cells: &[&str; 5]| {
        let mut line = String::from("|");
        for (cell, width) in cells.iter().zip(&widths) {
            let padding = width - cell.chars().count();
            line.push(' ');
            line.push_str(cell);
            line.extend(std::iter::repeat(' ').take(padding + 1));
            line.push('|');
        }
        line.push('\n');
        line
    };

    let mut table = separator('-');
    table.push_str(&format_row(&TABLE_HEADERS));
    table.push_str(&separator('='));
    for row in &rows {
        table.push_str(&format_row(row));
        table.push_str(&separator('-'));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, BatchSettings};
    use crate::vision::{OcrData, StaticOcrEngine};
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    fn extensions() -> Vec<String> {
        BatchSettings::default().extensions
    }

    fn write_image(dir: &Path, name: &str) {
        RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]))
            .save(dir.join(name))
            .unwrap();
    }

    fn soup_board() -> OcrData {
        let mut data = OcrData::default();
        data.push("SOUPS", 95.0, (0, 0, 80, 20));
        data.push("Tomato", 95.0, (0, 40, 60, 20));
        data.push("Soup", 95.0, (70, 40, 40, 20));
        data.push("90", 95.0, (300, 40, 20, 20));
        data.push("Cream", 95.0, (0, 80, 50, 20));
        data.push("Soup", 95.0, (60, 80, 40, 20));
        data.push("110", 95.0, (300, 80, 30, 20));
        data.push("Calories", 95.0, (0, 120, 70, 20));
        data.push("high", 95.0, (80, 120, 40, 20));
        data.push("in", 95.0, (130, 120, 20, 20));
        data.push("cream", 95.0, (160, 120, 50, 20));
        data
    }

    #[test]
    fn test_extension_filter() {
        let exts = extensions();
        assert!(has_image_extension(Path::new("menu.JPG"), &exts));
        assert!(has_image_extension(Path::new("a/b/menu.tiff"), &exts));
        assert!(!has_image_extension(Path::new("notes.txt"), &exts));
        assert!(!has_image_extension(Path::new("README"), &exts));
    }

    #[test]
    fn test_list_images_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        write_image(dir.path(), "b.png");
        write_image(dir.path(), "a.png");
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("sub.png")).unwrap();

        let images = list_images(dir.path(), &extensions()).unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_process_folder_applies_entry_filter() {
        let dir = TempDir::new().unwrap();
        write_image(dir.path(), "soups.png");
        let extractor = MenuExtractor::new(&AppConfig::default(), Box::new(StaticOcrEngine::new(soup_board())));

        let report = process_folder(&extractor, dir.path(), &extensions()).unwrap();
        assert_eq!(report.processed, 1);
        let items: Vec<&str> = report.entries.iter().map(|e| e.item.as_str()).collect();
        // "Cream Soup" carries the calories line as its description and is dropped
        assert_eq!(items, vec!["Tomato Soup"]);
        assert_eq!(report.entries[0].image, "soups.png");
    }

    #[test]
    fn test_process_folder_continues_after_failure() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a_broken.png"), b"garbage").unwrap();
        write_image(dir.path(), "b_soups.png");
        let extractor = MenuExtractor::new(&AppConfig::default(), Box::new(StaticOcrEngine::new(soup_board())));

        let report = process_folder(&extractor, dir.path(), &extensions()).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.processed, 1);
        assert_eq!(report.entries.len(), 1);
    }

    #[test]
    fn test_missing_folder_is_error() {
        let extractor = MenuExtractor::new(&AppConfig::default(), Box::new(StaticOcrEngine::default()));
        assert!(process_folder(&extractor, Path::new("/nonexistent/menus"), &extensions()).is_err());
    }

    #[test]
    fn test_render_table() {
        let entries = vec![MenuEntry {
            image: "m.png".to_string(),
            category: "TEA".to_string(),
            item: "Masala Chai".to_string(),
            price: "₹ 25".to_string(),
            description: " with ginger".to_string(),
        }];

        let table = render_table(&entries);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("| image | category | item        | price |"));
        assert!(lines[3].contains("| Masala Chai | ₹ 25  | with ginger |"));
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }
}
