//! The text report: the run's must-have artefact.
//!
//! A header block (deck name, timestamp, the project context that was in
//! effect, a short legend) followed by one `Page <n>: …` entry per input
//! page in deck order. Failure to write it aborts the run — unlike the
//! guide, which is decoration on top of this file.

use crate::error::DecktalkError;
use crate::output::PageNarration;
use crate::prompts::{DETAILS_MARKER, HEADLINE_MARKER, TRANSITION_MARKER};
use chrono::{DateTime, Local};
use std::path::Path;

/// File name for the report, stamped so successive runs never clobber
/// each other.
pub fn report_file_name(deck_name: &str, now: DateTime<Local>) -> String {
    format!("{deck_name}_walkthrough_{}.txt", now.format("%Y%m%d-%H%M%S"))
}

/// Render the full report text.
pub fn render_report(
    deck_name: &str,
    project_context: &str,
    narrations: &[PageNarration],
    now: DateTime<Local>,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("DECK WALKTHROUGH: {deck_name}\n"));
    out.push_str(&format!("Generated: {}\n\n", now.format("%Y-%m-%d %H:%M:%S")));

    out.push_str("PROJECT CONTEXT:\n");
    out.push_str(project_context);
    out.push_str("\n\n");

    out.push_str("HOW TO READ THIS:\n");
    out.push_str(&format!(
        "- {HEADLINE_MARKER} lines are the anchor — the one thing each slide must land\n"
    ));
    out.push_str(&format!(
        "- {DETAILS_MARKER} lines hold the arguments for when the discussion deepens\n"
    ));
    out.push_str(&format!(
        "- {TRANSITION_MARKER} lines bridge smoothly into the next slide\n\n"
    ));

    out.push_str("NARRATION:\n");
    out.push_str("=================\n\n");

    for narration in narrations {
        out.push_str(&narration.report_line());
        out.push_str("\n\n");
    }

    out
}

/// Write the report atomically (temp file + rename) so a crash mid-write
/// never leaves a half-report next to the deck.
pub async fn write_report(path: &Path, content: &str) -> Result<(), DecktalkError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DecktalkError::ReportWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("txt.tmp");
    tokio::fs::write(&tmp_path, content)
        .await
        .map_err(|e| DecktalkError::ReportWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| DecktalkError::ReportWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(())
}
