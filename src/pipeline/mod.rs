//! Pipeline stages for deck narration.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch rendering backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ classify ──▶ encode ──▶ narrate ──▶ extract
//! (path)   (pdfium)   (luminance)  (jpeg+b64)  (VLM call)  (context fold)
//! ```
//!
//! 1. [`input`]    — validate the deck path: exists, readable, `%PDF`
//!    magic, within the size cap
//! 2. [`render`]   — rasterise all pages; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`classify`] — the text-vs-visual luminance heuristic
//! 4. [`encode`]   — JPEG-encode, base64-wrap, and park a temp file per
//!    slide for later thumbnailing
//! 5. [`narrate`]  — drive the narration call with timeout and retry; the
//!    only stage with network I/O besides extract
//! 6. [`extract`]  — fold structured signal from each narration into the
//!    rolling context
//! 7. [`postprocess`] — deterministic cleanup of narration text
pub mod classify;
pub mod encode;
pub mod extract;
pub mod input;
pub mod narrate;
pub mod postprocess;
pub mod render;
