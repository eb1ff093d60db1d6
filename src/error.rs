//! Error types for the decktalk library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`DecktalkError`] — **Fatal**: the run cannot proceed at all
//!   (missing or oversized deck, rasterisation failure, no provider
//!   configured, report not writable). Returned as `Err(DecktalkError)`
//!   from [`crate::run::Narrator::run`].
//!
//! * [`PageError`] — **Non-fatal**: narration for a single page failed
//!   (transient API error, timeout) but all other pages are fine. Stored
//!   inside [`crate::output::PageNarration`] so callers can inspect
//!   partial success rather than losing the whole deck to one bad page.
//!
//! The separation lets callers decide their own tolerance: abort on the
//! first page failure, log and continue, or collect all failures for the
//! final report.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the decktalk library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::PageNarration`] rather than propagated here.
#[derive(Debug, Error)]
pub enum DecktalkError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The deck exceeds the configured input size cap.
    #[error("Deck '{path}' is {size_mb} MB, above the {limit_mb} MB limit")]
    DeckTooLarge {
        path: PathBuf,
        size_mb: u64,
        limit_mb: u64,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The deck rasterised to zero pages.
    #[error("Deck '{path}' contains no pages")]
    EmptyDeck { path: PathBuf },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Run errors ────────────────────────────────────────────────────────
    /// A second run was requested while one is still in flight.
    ///
    /// The narration context and the temporary slide directory are owned
    /// exclusively by the active run; overlapping runs are rejected rather
    /// than interleaved.
    #[error("A narration run is already in progress on this session")]
    RunInProgress,

    /// The run was cancelled between pages via the cooperative flag.
    #[error("Run cancelled after {completed}/{total} pages")]
    Cancelled { completed: usize, total: usize },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the text report.
    #[error("Failed to write report '{path}': {source}")]
    ReportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
///
/// Stored alongside [`crate::output::PageNarration`] when narration for a
/// page fails. The overall run continues with the remaining pages.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Narration call failed after all attempts.
    #[error("Page {page}: narration failed after {attempts} attempts: {detail}")]
    NarrationFailed {
        page: usize,
        attempts: u32,
        detail: String,
    },

    /// Narration call exceeded the per-call timeout on its final attempt.
    #[error("Page {page}: narration timed out after {secs}s")]
    Timeout { page: usize, secs: u64 },
}

/// Error surfaced by a [`crate::backend::NarrationBackend`] call.
///
/// Carries only a human-readable cause: the retry loop treats every
/// backend failure the same way, so no finer taxonomy is needed here.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_too_large_display() {
        let e = DecktalkError::DeckTooLarge {
            path: PathBuf::from("deck.pdf"),
            size_mb: 61,
            limit_mb: 50,
        };
        let msg = e.to_string();
        assert!(msg.contains("61 MB"), "got: {msg}");
        assert!(msg.contains("50 MB"), "got: {msg}");
    }

    #[test]
    fn cancelled_display() {
        let e = DecktalkError::Cancelled {
            completed: 4,
            total: 12,
        };
        assert!(e.to_string().contains("4/12"));
    }

    #[test]
    fn narration_failed_display() {
        let e = PageError::NarrationFailed {
            page: 7,
            attempts: 3,
            detail: "connection reset".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Page 7"));
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn timeout_display() {
        let e = PageError::Timeout { page: 3, secs: 30 };
        assert!(e.to_string().contains("30s"));
        assert!(e.to_string().contains("Page 3"));
    }
}
