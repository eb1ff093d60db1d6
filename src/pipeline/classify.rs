//! The text-vs-visual page heuristic.
//!
//! Dense body text rendered at slide resolution darkens a large share of
//! the page; charts, mockups, and photography mostly do not. Counting
//! dark pixels is therefore a usable — and deliberately crude — proxy for
//! "this slide is a wall of text the narrator should skip". It is not a
//! text detector: a dark-background title slide will misclassify, and
//! that is accepted. Classification is deterministic, never cached, and
//! never retried.
//!
//! A slide that cannot be read or decoded classifies as visual (fail
//! open): wrongly narrating one slide is cheaper than silently dropping
//! it from the walkthrough.

use image::DynamicImage;
use std::path::Path;
use tracing::warn;

/// Verdict of the luminance heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Mostly text; the narrator skips it.
    TextDominant,
    /// Anything else; gets narrated.
    Visual,
}

/// Classify a slide from its encoded image file.
///
/// Read or decode failures log and fail open to [`PageKind::Visual`];
/// classification never aborts a run.
pub fn classify_file(path: &Path, dark_cutoff: u8, ratio_threshold: f32) -> PageKind {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            warn!("Could not read slide image {}: {e}", path.display());
            return PageKind::Visual;
        }
    };
    classify_bytes(&bytes, dark_cutoff, ratio_threshold)
}

/// Classify a slide from encoded image bytes, failing open on decode errors.
pub fn classify_bytes(bytes: &[u8], dark_cutoff: u8, ratio_threshold: f32) -> PageKind {
    match image::load_from_memory(bytes) {
        Ok(img) => classify_image(&img, dark_cutoff, ratio_threshold),
        Err(e) => {
            warn!("Could not decode slide image for classification: {e}");
            PageKind::Visual
        }
    }
}

/// Classify a decoded slide image.
///
/// Converts to single-channel luminance, counts pixels strictly below
/// `dark_cutoff`, and compares the dark ratio against `ratio_threshold`.
/// The boundary is exclusive: a ratio exactly at the threshold is visual.
pub fn classify_image(image: &DynamicImage, dark_cutoff: u8, ratio_threshold: f32) -> PageKind {
    if dark_ratio(image, dark_cutoff) > ratio_threshold {
        PageKind::TextDominant
    } else {
        PageKind::Visual
    }
}

/// Share of pixels with luminance strictly below `dark_cutoff`.
fn dark_ratio(image: &DynamicImage, dark_cutoff: u8) -> f32 {
    let luma = image.to_luma8();
    let total = luma.as_raw().len();
    if total == 0 {
        return 0.0;
    }
    let dark = luma.as_raw().iter().filter(|&&p| p < dark_cutoff).count();
    dark as f32 / total as f32
}
