//! Slide encoding: `DynamicImage` → JPEG on disk + base64 for the API.
//!
//! JPEG is the right codec here, unlike for OCR work: slides are
//! photographic or flat-colour compositions where JPEG artefacts are
//! invisible to a vision model, and quality 95 keeps files an order of
//! magnitude smaller than PNG. A slide that still encodes above the
//! upload cap (20 MB per the API documentation) is re-encoded once at
//! the fallback quality.
//!
//! Each slide is also parked as `slide_N.jpg` in the run's temp directory
//! so the guide stage can thumbnail it later without keeping every
//! decoded page in memory.

use crate::config::NarrationConfig;
use crate::error::DecktalkError;
use crate::pipeline::render::RenderedPage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// MIME type of every encoded slide.
pub const SLIDE_MIME: &str = "image/jpeg";

/// A slide ready for the narration API and the guide stage.
pub struct EncodedSlide {
    /// 1-based page number in deck order.
    pub page_num: usize,
    /// Rendered pixel dimensions.
    pub width: u32,
    pub height: u32,
    /// Base64 JPEG payload for the API request body.
    pub base64: String,
    /// The temp file holding the JPEG, owned by the run's temp directory.
    pub jpeg_path: PathBuf,
    /// Encoded size in bytes (pre-base64).
    pub encoded_len: usize,
}

/// Encode one rendered page and park its JPEG in `temp_dir`.
///
/// Encoding failures are fatal: a page that rendered but cannot be
/// encoded indicates a broken pipeline, not a transient glitch.
pub fn encode_slide(
    page: &RenderedPage,
    config: &NarrationConfig,
    temp_dir: &Path,
) -> Result<EncodedSlide, DecktalkError> {
    let mut jpeg = encode_jpeg(&page.image, config.jpeg_quality).map_err(|e| {
        DecktalkError::RasterisationFailed {
            page: page.page_num,
            detail: format!("JPEG encoding failed: {}", e),
        }
    })?;

    if jpeg.len() > config.max_encoded_bytes {
        warn!(
            "Slide {} encodes to {} bytes, above the {} cap; re-encoding at quality {}",
            page.page_num,
            jpeg.len(),
            config.max_encoded_bytes,
            config.jpeg_fallback_quality
        );
        jpeg = encode_jpeg(&page.image, config.jpeg_fallback_quality).map_err(|e| {
            DecktalkError::RasterisationFailed {
                page: page.page_num,
                detail: format!("JPEG re-encoding failed: {}", e),
            }
        })?;
    }

    let jpeg_path = temp_dir.join(format!("slide_{}.jpg", page.page_num));
    std::fs::write(&jpeg_path, &jpeg).map_err(|e| DecktalkError::Internal(format!(
        "Failed to write temp slide {}: {}",
        jpeg_path.display(),
        e
    )))?;

    let b64 = STANDARD.encode(&jpeg);
    debug!(
        "Encoded slide {} → {} bytes JPEG, {} bytes base64",
        page.page_num,
        jpeg.len(),
        b64.len()
    );

    Ok(EncodedSlide {
        page_num: page.page_num,
        width: page.image.width(),
        height: page.image.height(),
        base64: b64,
        jpeg_path,
        encoded_len: jpeg.len(),
    })
}

/// JPEG-encode at the given quality. Alpha is flattened first: JPEG has
/// no alpha channel and the encoder rejects RGBA input.
fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;
    Ok(buf)
}
