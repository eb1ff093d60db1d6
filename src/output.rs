//! Output types: per-page narration results, run statistics, and the
//! final run artefacts.
//!
//! Every input page produces exactly one [`PageNarration`], in input
//! order, whatever happened to it — narrated, skipped as text-dominant,
//! or failed after retries. Callers (and the report writer) can therefore
//! always reconstruct the full deck from the output alone.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Deck-level metadata extracted before rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckMetadata {
    /// Title from the PDF info dictionary, if any.
    pub title: Option<String>,
    /// Author from the PDF info dictionary, if any.
    pub author: Option<String>,
    /// Subject from the PDF info dictionary, if any.
    pub subject: Option<String>,
    /// Total page count of the deck.
    pub page_count: usize,
}

/// What happened to a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NarrationOutcome {
    /// The page was narrated successfully.
    Narrated { text: String },
    /// The page classified as text-dominant and was skipped by design.
    SkippedTextPage,
    /// Narration failed after exhausting all retry attempts.
    Failed { error: PageError },
}

/// One page's result: its 1-based number plus the outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageNarration {
    /// 1-based page number in deck order.
    pub page_num: usize,
    pub outcome: NarrationOutcome,
    /// Wall-clock time spent on this page, including retries.
    pub duration_ms: u64,
    /// Narration attempts made (0 for skipped pages).
    pub attempts: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl PageNarration {
    /// Narration text, if the page was narrated.
    pub fn narration_text(&self) -> Option<&str> {
        match &self.outcome {
            NarrationOutcome::Narrated { text } => Some(text),
            _ => None,
        }
    }

    /// The `Page <n>: …` line this page contributes to the text report.
    ///
    /// Skips and failures get distinct bracketed markers so a reader can
    /// tell "nothing to say" apart from "could not say it".
    pub fn report_line(&self) -> String {
        match &self.outcome {
            NarrationOutcome::Narrated { text } => {
                format!("Page {}: {}", self.page_num, text.trim_end())
            }
            NarrationOutcome::SkippedTextPage => {
                format!("Page {}: [skipped — text-dominant page]", self.page_num)
            }
            NarrationOutcome::Failed { error } => format!(
                "Page {}: [failed after {} attempts: {}]",
                self.page_num, self.attempts, error
            ),
        }
    }
}

/// Aggregate statistics for a completed run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub total_pages: usize,
    pub narrated_pages: usize,
    pub skipped_pages: usize,
    pub failed_pages: usize,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub render_duration_ms: u64,
    pub narration_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl RunStats {
    /// One-line human-readable completion summary.
    pub fn summary(&self) -> String {
        format!(
            "{} narrated, {} skipped, {} failed of {} pages in {:.1}s",
            self.narrated_pages,
            self.skipped_pages,
            self.failed_pages,
            self.total_pages,
            self.total_duration_ms as f64 / 1000.0,
        )
    }
}

/// Everything a successful run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    /// One entry per input page, in deck order.
    pub narrations: Vec<PageNarration>,
    pub metadata: DeckMetadata,
    pub stats: RunStats,
    /// Where the text report was written. Always present: the report is
    /// the must-have artefact of a run.
    pub report_path: PathBuf,
    /// Where the illustrated guide was written, when it was produced.
    /// `None` when disabled or when guide rendering failed (non-fatal).
    pub guide_path: Option<PathBuf>,
}
