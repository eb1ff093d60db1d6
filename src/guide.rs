//! The illustrated presenter guide: an A4 PDF with one section per
//! narrated slide — heading, thumbnail, and the talking points formatted
//! by their line markers.
//!
//! The guide is decoration on top of the text report: if anything in
//! here fails, the run logs it and finishes without a guide. Rendering
//! uses the built-in Helvetica faces so no font files ship with the
//! binary, and thumbnails are embedded as raw RGB so the deck images
//! never round-trip through a second codec.

use crate::error::DecktalkError;
use crate::output::PageNarration;
use crate::pipeline::encode::EncodedSlide;
use crate::prompts::{DETAILS_MARKER, HEADLINE_MARKER, TRANSITION_MARKER};
use printpdf::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// A4 geometry in millimetres.
const PAGE_W: f64 = 210.0;
const PAGE_H: f64 = 297.0;
const LEFT_X: f64 = 20.0;
const TOP_Y: f64 = 277.0;
const BOTTOM_Y: f64 = 20.0;

/// Thumbnail bounding box in pixels; slides shrink to fit.
const THUMB_MAX_W: u32 = 200;
const THUMB_MAX_H: u32 = 150;

/// Everything the guide needs for one slide's section.
pub struct GuideSection {
    pub page_num: usize,
    pub narration: String,
    pub jpeg_path: PathBuf,
}

/// File name for the guide, next to the report.
pub fn guide_file_name(deck_name: &str) -> String {
    format!("{deck_name}_presentation_guide.pdf")
}

/// Pair narrated pages with their slide images.
///
/// Skipped and failed pages produce no section; neither does a narration
/// that cleaned down to nothing.
pub fn collect_sections(
    narrations: &[PageNarration],
    slides: &[EncodedSlide],
) -> Vec<GuideSection> {
    narrations
        .iter()
        .filter_map(|n| {
            let text = n.narration_text()?.trim();
            if text.is_empty() {
                return None;
            }
            let slide = slides.iter().find(|s| s.page_num == n.page_num)?;
            Some(GuideSection {
                page_num: n.page_num,
                narration: text.to_string(),
                jpeg_path: slide.jpeg_path.clone(),
            })
        })
        .collect()
}

/// Render the guide to `out_path`.
pub fn render_guide(
    deck_name: &str,
    sections: &[GuideSection],
    out_path: &Path,
) -> Result<(), DecktalkError> {
    let title = format!("Presentation guide: {deck_name}");
    let (doc, page1, layer1) = PdfDocument::new(
        title.clone(),
        Mm(PAGE_W as _),
        Mm(PAGE_H as _),
        "Layer 1",
    );

    let regular = builtin(&doc, BuiltinFont::Helvetica)?;
    let bold = builtin(&doc, BuiltinFont::HelveticaBold)?;
    let italic = builtin(&doc, BuiltinFont::HelveticaOblique)?;

    let mut page = GuidePage {
        layer: doc.get_page(page1).get_layer(layer1),
        y: TOP_Y,
    };

    page.text(&title, 18.0, 9.0, &bold);
    page.y -= 6.0;

    for section in sections {
        // Keep the heading and the thumbnail together on one page.
        page.ensure_room(&doc, 70.0);

        page.text(&format!("Slide {}", section.page_num), 14.0, 8.0, &bold);

        match load_thumbnail(&section.jpeg_path) {
            Some(thumb) => page.place_thumbnail(thumb),
            None => warn!(
                "No thumbnail for slide {} ({} unreadable)",
                section.page_num,
                section.jpeg_path.display()
            ),
        }

        for raw_line in section.narration.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            let (style, text) = style_line(line);
            let (font, size, advance) = match style {
                LineStyle::Headline => (&bold, 12.0, 5.5),
                LineStyle::Details => (&regular, 10.0, 4.5),
                LineStyle::Transition => (&italic, 10.0, 4.5),
                LineStyle::Plain => (&regular, 10.0, 4.5),
            };
            for piece in wrap_text(&text, 92) {
                page.ensure_room(&doc, advance);
                page.text(&piece, size, advance, font);
            }
        }

        page.y -= 10.0;
    }

    let file = File::create(out_path).map_err(|e| {
        DecktalkError::Internal(format!("Failed to create guide '{}': {}", out_path.display(), e))
    })?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| DecktalkError::Internal(format!("Failed to render guide: {:?}", e)))?;

    debug!("Guide written to {}", out_path.display());
    Ok(())
}

// ── Layout plumbing ───────────────────────────────────────────────────────

struct GuidePage {
    layer: PdfLayerReference,
    y: f64,
}

impl GuidePage {
    /// Start a fresh page when fewer than `needed` millimetres remain.
    fn ensure_room(&mut self, doc: &PdfDocumentReference, needed: f64) {
        if self.y - needed < BOTTOM_Y {
            let (page, layer) = doc.add_page(Mm(PAGE_W as _), Mm(PAGE_H as _), "Layer 1");
            self.layer = doc.get_page(page).get_layer(layer);
            self.y = TOP_Y;
        }
    }

    /// Write one line at the cursor and advance down.
    fn text(&mut self, text: &str, size: f64, advance: f64, font: &IndirectFontRef) {
        self.layer.use_text(
            text,
            size as _,
            Mm(LEFT_X as _),
            Mm(self.y as _),
            font,
        );
        self.y -= advance;
    }

    /// Place a raw RGB thumbnail at the cursor and advance past it.
    fn place_thumbnail(&mut self, thumb: Thumbnail) {
        // 96 DPI: a 200 px thumbnail prints at ~53 mm wide.
        let height_mm = thumb.height as f64 * 25.4 / 96.0;
        self.y -= height_mm;

        let xobject = ImageXObject {
            width: Px(thumb.width as usize),
            height: Px(thumb.height as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: thumb.rgb,
            image_filter: None,
            clipping_bbox: None,
        };
        Image::from(xobject).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(LEFT_X as _)),
                translate_y: Some(Mm(self.y as _)),
                dpi: Some(96.0),
                ..Default::default()
            },
        );

        self.y -= 6.0;
    }
}

fn builtin(
    doc: &PdfDocumentReference,
    font: BuiltinFont,
) -> Result<IndirectFontRef, DecktalkError> {
    doc.add_builtin_font(font)
        .map_err(|e| DecktalkError::Internal(format!("Failed to load builtin font: {:?}", e)))
}

struct Thumbnail {
    rgb: Vec<u8>,
    width: u32,
    height: u32,
}

/// Decode a slide JPEG and shrink it to thumbnail size as raw RGB.
fn load_thumbnail(path: &Path) -> Option<Thumbnail> {
    let img = ::image::open(path).ok()?;
    let thumb = img.thumbnail(THUMB_MAX_W, THUMB_MAX_H).to_rgb8();
    let (width, height) = thumb.dimensions();
    Some(Thumbnail {
        rgb: thumb.into_raw(),
        width,
        height,
    })
}

// ── Line styling ──────────────────────────────────────────────────────────

/// Emphasis classes for narration lines in the guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineStyle {
    Headline,
    Details,
    Transition,
    Plain,
}

/// Recognise a marker prefix and produce the rendered label + text.
/// Lines without a recognised marker render as plain text, untouched.
pub(crate) fn style_line(line: &str) -> (LineStyle, String) {
    if let Some(rest) = line.strip_prefix(HEADLINE_MARKER) {
        (LineStyle::Headline, format!("Key point —{rest}"))
    } else if let Some(rest) = line.strip_prefix(DETAILS_MARKER) {
        (LineStyle::Details, format!("Details —{rest}"))
    } else if let Some(rest) = line.strip_prefix(TRANSITION_MARKER) {
        (LineStyle::Transition, format!("Transition —{rest}"))
    } else {
        (LineStyle::Plain, line.to_string())
    }
}

/// Greedy word wrap at `max_chars` characters per line.
///
/// Helvetica at guide sizes fits comfortably over 92 characters across
/// the text column; exact metrics are not worth a text-shaping pass for
/// a cheat-sheet document.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
