//! Deck rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. `tokio::task::spawn_blocking` moves the work onto a thread
//! designed for blocking operations, so the Tokio workers driving the
//! status channel never stall during CPU-heavy rendering.
//!
//! ## Why cap the longest edge?
//!
//! Slide aspect ratios vary, and a widescreen deck exported at print
//! resolution can rasterise enormous. Vision APIs downscale anything past
//! roughly 2000 px anyway, so rendering larger only burns memory and
//! upload time. The cap bounds the longest edge and scales the other
//! proportionally.

use crate::error::DecktalkError;
use crate::output::DeckMetadata;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// One rasterised page: its 1-based number and pixel data.
pub struct RenderedPage {
    pub page_num: usize,
    pub image: DynamicImage,
}

/// Rasterise every page of the deck into images, optionally capped to the
/// first `limit` pages (preview mode).
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound.
/// Any failure here is fatal to the run: a deck that cannot be rendered
/// cannot be narrated.
pub async fn render_deck(
    pdf_path: &Path,
    max_pixels: u32,
    limit: Option<usize>,
) -> Result<Vec<RenderedPage>, DecktalkError> {
    let path = pdf_path.to_path_buf();

    let result =
        tokio::task::spawn_blocking(move || render_deck_blocking(&path, max_pixels, limit))
            .await
            .map_err(|e| DecktalkError::Internal(format!("Render task panicked: {}", e)))?;

    result
}

/// Blocking implementation of deck rendering.
fn render_deck_blocking(
    pdf_path: &Path,
    max_pixels: u32,
    limit: Option<usize>,
) -> Result<Vec<RenderedPage>, DecktalkError> {
    let pdfium = Pdfium::default();

    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| DecktalkError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: format!("{:?}", e),
            })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    if total_pages == 0 {
        return Err(DecktalkError::EmptyDeck {
            path: pdf_path.to_path_buf(),
        });
    }
    let take = limit.unwrap_or(total_pages).min(total_pages);
    info!("Deck loaded: {} pages, rendering {}", total_pages, take);

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut results = Vec::with_capacity(take);

    for idx in 0..take {
        let page = pages
            .get(idx as u16)
            .map_err(|e| DecktalkError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            DecktalkError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push(RenderedPage {
            page_num: idx + 1,
            image,
        });
    }

    Ok(results)
}

/// Extract deck metadata without rendering pages.
pub async fn extract_metadata(pdf_path: &Path) -> Result<DeckMetadata, DecktalkError> {
    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || extract_metadata_blocking(&path))
        .await
        .map_err(|e| DecktalkError::Internal(format!("Metadata task panicked: {}", e)))?
}

/// Blocking implementation of metadata extraction.
fn extract_metadata_blocking(pdf_path: &Path) -> Result<DeckMetadata, DecktalkError> {
    let pdfium = Pdfium::default();

    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| DecktalkError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: format!("{:?}", e),
            })?;

    let metadata = document.metadata();
    let pages = document.pages();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DeckMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        page_count: pages.len() as usize,
    })
}
