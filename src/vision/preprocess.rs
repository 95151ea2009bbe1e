//! Image preprocessing filters for OCR optimization
//!
//! Photographed menus are often low contrast or printed light-on-dark.
//! Filters are applied in a fixed order: upscale, contrast, grayscale, invert.

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use tracing::debug;

use crate::config::OcrPreprocessing;

/// Preprocessed image plus the factor its coordinates were scaled by
pub struct PreprocessResult {
    pub image: DynamicImage,
    /// Upscale factor applied (1 = original geometry)
    pub scale: u32,
}

/// Apply preprocessing filters based on settings
pub fn apply_preprocessing(image: DynamicImage, settings: &OcrPreprocessing) -> PreprocessResult {
    if !settings.enabled {
        debug!("OCR preprocessing disabled");
        return PreprocessResult { image, scale: 1 };
    }

    debug!(
        "OCR preprocessing enabled: grayscale={}, invert={}, contrast={}, scale={}",
        settings.grayscale, settings.invert, settings.contrast, settings.scale
    );

    let scale = settings.scale.max(1);
    let image = if scale > 1 {
        image.resize_exact(
            image.width() * scale,
            image.height() * scale,
            FilterType::Triangle,
        )
    } else {
        image
    };

    let mut rgba = image.to_rgba8();

    if (settings.contrast - 1.0).abs() > 0.01 {
        apply_contrast(&mut rgba, settings.contrast);
    }

    if settings.grayscale {
        apply_grayscale(&mut rgba);
    }

    if settings.invert {
        apply_invert(&mut rgba);
    }

    PreprocessResult {
        image: DynamicImage::ImageRgba8(rgba),
        scale,
    }
}

/// Factor > 1.0 increases contrast around mid-gray, < 1.0 decreases
fn apply_contrast(image: &mut RgbaImage, factor: f32) {
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            let adjusted = ((*channel as f32 - 128.0) * factor + 128.0).clamp(0.0, 255.0);
            *channel = adjusted as u8;
        }
    }
}

fn apply_grayscale(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let gray = (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) as u8;
        pixel.0[0] = gray;
        pixel.0[1] = gray;
        pixel.0[2] = gray;
    }
}

fn apply_invert(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            *channel = 255 - *channel;
        }
    }
}
