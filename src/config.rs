//! Configuration types for deck narration.
//!
//! All run behaviour is controlled through [`NarrationConfig`], built via
//! its [`NarrationConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across threads, log them, and diff two runs
//! to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A fifteen-field constructor is unreadable and breaks on every new field.
//! The builder pattern lets callers set only what they care about and rely
//! on well-documented defaults for the rest.

use crate::error::DecktalkError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Placeholder text shown to the operator before they type a real project
/// description. Input equal to this (or blank) is treated as "no context
/// supplied" and replaced by a generic fallback at prompt time.
pub const PLACEHOLDER_PROJECT_CONTEXT: &str = "Describe the project. For example:\n\
This is a rebranding deck for company X, operating in industry Y.\n\
The main goal of the redesign is Z. The target audience is A.";

/// Configuration for a deck narration run.
///
/// Built via [`NarrationConfig::builder()`] or using
/// [`NarrationConfig::default()`].
///
/// # Example
/// ```rust
/// use decktalk::NarrationConfig;
///
/// let config = NarrationConfig::builder()
///     .project_context("Q3 architecture review for the platform team")
///     .max_tokens(600)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct NarrationConfig {
    /// Maximum input deck size in megabytes. Default: 50.
    ///
    /// Checked before the run starts; an oversized deck is an input error,
    /// not a mid-run abort.
    pub max_input_mb: u64,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 2000.
    ///
    /// Vision APIs cap accepted image dimensions around 2000 px; anything
    /// larger is downscaled server-side anyway, so rendering bigger images
    /// only wastes memory and upload time.
    pub max_rendered_pixels: u32,

    /// JPEG quality for encoded slides. Default: 95.
    pub jpeg_quality: u8,

    /// Reduced JPEG quality used when a slide encodes above
    /// [`Self::max_encoded_bytes`]. Default: 85.
    pub jpeg_fallback_quality: u8,

    /// Encoded-slide size ceiling in bytes. Default: 20 MB.
    ///
    /// Matches the upload limit documented by the vision APIs. A slide
    /// above this after the first encode is re-encoded at
    /// [`Self::jpeg_fallback_quality`].
    pub max_encoded_bytes: usize,

    /// Luminance value (0–255) below which a pixel counts as "dark" for
    /// the text-page heuristic. Default: 128.
    pub dark_luma_cutoff: u8,

    /// Dark-pixel ratio above which a page is classified text-dominant.
    /// Default: 0.15. The boundary is exclusive: a ratio of exactly 0.15
    /// classifies as visual.
    ///
    /// This is a deliberately crude heuristic, not a text detector. Dense
    /// body text darkens well over 15 % of a rendered page, while charts,
    /// mockups, and photography stay under it. Misclassifications are
    /// accepted and never retried.
    pub text_ratio_threshold: f32,

    /// Retry policy for narration calls. Default: 3 attempts, 2 s apart.
    pub retry: RetryPolicy,

    /// Per-API-call timeout in seconds. Default: 30.
    ///
    /// Exceeding it counts as a failed attempt for retry purposes.
    pub api_timeout_secs: u64,

    /// Maximum tokens the model may generate per narration. Default: 500.
    ///
    /// Narrations are talking points, not transcripts; 500 tokens is
    /// roughly half a page of spoken material per slide.
    pub max_tokens: usize,

    /// Sampling temperature for narration calls. Default: None
    /// (provider default). Narration benefits from some variety, unlike
    /// transcription, so we do not pin it low.
    pub temperature: Option<f32>,

    /// LLM model identifier, e.g. "gpt-4o-mini", "claude-sonnet-4-20250514".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None, the provider is auto-detected from the environment.
    pub provider_name: Option<String>,

    /// Operator-supplied free text describing the deck's purpose.
    ///
    /// Embedded verbatim in every narration prompt of the run. Blank text
    /// or the [`PLACEHOLDER_PROJECT_CONTEXT`] sentinel are treated as "no
    /// context supplied".
    pub project_context: Option<String>,

    /// Preview mode: narrate only the first N pages. Default: None (all).
    pub preview_pages: Option<usize>,

    /// Pause between pages in preview mode, in milliseconds. Default: 2000.
    ///
    /// Preview runs are for eyeballing prompt quality against a live API;
    /// the pause keeps a rapid-fire preview from tripping rate limits.
    pub preview_pause_ms: u64,

    /// Directory for the report and guide. Default: None (next to the deck).
    pub output_dir: Option<PathBuf>,

    /// Whether to render the illustrated presenter guide. Default: true.
    pub build_guide: bool,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            max_input_mb: 50,
            max_rendered_pixels: 2000,
            jpeg_quality: 95,
            jpeg_fallback_quality: 85,
            max_encoded_bytes: 20 * 1024 * 1024,
            dark_luma_cutoff: 128,
            text_ratio_threshold: 0.15,
            retry: RetryPolicy::default(),
            api_timeout_secs: 30,
            max_tokens: 500,
            temperature: None,
            model: None,
            provider_name: None,
            project_context: None,
            preview_pages: None,
            preview_pause_ms: 2000,
            output_dir: None,
            build_guide: true,
        }
    }
}

impl NarrationConfig {
    /// Create a new builder for `NarrationConfig`.
    pub fn builder() -> NarrationConfigBuilder {
        NarrationConfigBuilder {
            config: Self::default(),
        }
    }

    /// The project context that actually reaches prompts, if any.
    ///
    /// Returns `None` when the operator supplied nothing, blank text, or
    /// left the placeholder untouched.
    pub fn effective_context(&self) -> Option<&str> {
        let text = self.project_context.as_deref()?.trim();
        if text.is_empty() || text == PLACEHOLDER_PROJECT_CONTEXT.trim() {
            None
        } else {
            Some(text)
        }
    }
}

/// Builder for [`NarrationConfig`].
#[derive(Debug)]
pub struct NarrationConfigBuilder {
    config: NarrationConfig,
}

impl NarrationConfigBuilder {
    pub fn max_input_mb(mut self, mb: u64) -> Self {
        self.config.max_input_mb = mb.max(1);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn jpeg_fallback_quality(mut self, q: u8) -> Self {
        self.config.jpeg_fallback_quality = q.clamp(1, 100);
        self
    }

    pub fn text_ratio_threshold(mut self, t: f32) -> Self {
        self.config.text_ratio_threshold = t.clamp(0.0, 1.0);
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn project_context(mut self, text: impl Into<String>) -> Self {
        self.config.project_context = Some(text.into());
        self
    }

    pub fn preview_pages(mut self, n: usize) -> Self {
        self.config.preview_pages = Some(n.max(1));
        self
    }

    pub fn preview_pause_ms(mut self, ms: u64) -> Self {
        self.config.preview_pause_ms = ms;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn build_guide(mut self, v: bool) -> Self {
        self.config.build_guide = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<NarrationConfig, DecktalkError> {
        let c = &self.config;
        if c.retry.max_attempts == 0 {
            return Err(DecktalkError::InvalidConfig(
                "Retry policy needs at least 1 attempt".into(),
            ));
        }
        if c.jpeg_fallback_quality > c.jpeg_quality {
            return Err(DecktalkError::InvalidConfig(format!(
                "Fallback JPEG quality ({}) must not exceed the primary quality ({})",
                c.jpeg_fallback_quality, c.jpeg_quality
            )));
        }
        Ok(self.config)
    }
}

// ── Retry policy ──────────────────────────────────────────────────────────

/// Named retry policy for narration calls: a fixed number of attempts with
/// a fixed delay between them.
///
/// Kept as its own type (rather than loose config fields) so the policy
/// can be unit-tested and swapped without touching call sites. The delay
/// is fixed, not exponential: attempts are spaced by a human-scale pause
/// and capped at 3, so backoff growth buys nothing here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Minimum 1.
    pub max_attempts: u32,
    /// Delay before each retry, in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 2000,
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep before the given attempt (0-based).
    ///
    /// The first attempt is immediate; every retry waits the fixed delay.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(self.delay_ms)
        }
    }
}
