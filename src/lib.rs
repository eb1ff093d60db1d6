//! # decktalk
//!
//! Turn a PDF slide deck into a narrated walkthrough using Vision
//! Language Models (VLMs).
//!
//! ## Why this crate?
//!
//! Slide decks travel without their presenter. decktalk rasterises each
//! slide, shows it to a VLM, and writes the commentary a presenter would
//! give — slide by slide, with each page's narration conditioned on a
//! rolling summary of everything said so far, so the walkthrough reads
//! as one coherent story instead of N disconnected captions.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF deck
//!  │
//!  ├─ 1. Validate  size cap, %PDF magic
//!  ├─ 2. Render    rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Classify  luminance heuristic: text-dominant pages are skipped
//!  ├─ 4. Narrate   sequential VLM calls, each fed the rolling context
//!  ├─ 5. Extract   structured follow-up call folds signal into the context
//!  └─ 6. Output    text report + illustrated presenter guide (PDF)
//! ```
//!
//! Pages are processed strictly in order — narration quality depends on
//! causal context accumulation, so there is deliberately no concurrency
//! across pages.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use decktalk::{NarrationConfig, Narrator, RunControls};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = NarrationConfig::builder()
//!         .project_context("Rebranding pitch for a fintech client")
//!         .build()?;
//!     let narrator = Narrator::from_config(&config)?;
//!     let output = narrator.run("deck.pdf", &config, RunControls::default()).await?;
//!     println!("report: {}", output.report_path.display());
//!     eprintln!("{}", output.stats.summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `decktalk` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! decktalk = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod guide;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{BackendResponse, LlmBackend, NarrationBackend};
pub use config::{NarrationConfig, NarrationConfigBuilder, RetryPolicy, PLACEHOLDER_PROJECT_CONTEXT};
pub use context::{ContextUpdate, NarrationContext, RECENT_NARRATIONS_CAP};
pub use error::{BackendError, DecktalkError, PageError};
pub use events::{EventSink, RunEvent, RunState};
pub use output::{DeckMetadata, NarrationOutcome, PageNarration, RunOutput, RunStats};
pub use run::{Narrator, RunControls};
