//! Narration calls: one slide image in, one commentary out.
//!
//! This module is intentionally thin — all prompt text lives in
//! [`crate::prompts`] so the voice can change without touching retry or
//! error-handling logic here.
//!
//! ## Retry strategy
//!
//! Transient API failures (5xx, network blips, timeouts) are frequent
//! enough that one page must never sink a run. Each slide gets a fixed
//! number of attempts with a fixed pause between them, per the configured
//! [`crate::config::RetryPolicy`]; a retry that eventually succeeds is
//! indistinguishable from a first-try success in the output. Exhausting
//! every attempt records a failure for that page — it never propagates
//! past the page boundary.

use crate::backend::NarrationBackend;
use crate::config::NarrationConfig;
use crate::error::PageError;
use crate::output::{NarrationOutcome, PageNarration};
use crate::pipeline::encode::{EncodedSlide, SLIDE_MIME};
use crate::pipeline::postprocess;
use crate::prompts;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// Narrate one visual slide.
///
/// Always returns a [`PageNarration`] — either `Narrated` or `Failed`,
/// never an error. An empty response from the backend counts as a failed
/// attempt: a blank narration is useless and usually signals a content
/// filter or a truncated response worth retrying.
pub async fn narrate_slide(
    backend: &dyn NarrationBackend,
    slide: &EncodedSlide,
    project_context: &str,
    brief: &str,
    config: &NarrationConfig,
) -> PageNarration {
    let started = Instant::now();
    let system_prompt = prompts::narrator_system_prompt(project_context, brief);
    let api_timeout = Duration::from_secs(config.api_timeout_secs);

    let mut last_err: Option<String> = None;
    let mut last_was_timeout = false;

    for attempt in 0..config.retry.max_attempts {
        let delay = config.retry.delay_before(attempt);
        if !delay.is_zero() {
            warn!(
                "Page {}: retry {}/{} after {:?}",
                slide.page_num,
                attempt + 1,
                config.retry.max_attempts,
                delay
            );
            sleep(delay).await;
        }

        let call = backend.narrate_page(
            &system_prompt,
            prompts::NARRATION_USER_PROMPT,
            &slide.base64,
            SLIDE_MIME,
        );

        match timeout(api_timeout, call).await {
            Ok(Ok(response)) if !response.text.trim().is_empty() => {
                let duration = started.elapsed();
                debug!(
                    "Page {}: narrated in {:?} ({} in / {} out tokens, attempt {})",
                    slide.page_num,
                    duration,
                    response.input_tokens,
                    response.output_tokens,
                    attempt + 1
                );

                return PageNarration {
                    page_num: slide.page_num,
                    outcome: NarrationOutcome::Narrated {
                        text: postprocess::clean_narration(&response.text),
                    },
                    duration_ms: duration.as_millis() as u64,
                    attempts: attempt + 1,
                    input_tokens: response.input_tokens,
                    output_tokens: response.output_tokens,
                };
            }
            Ok(Ok(_)) => {
                warn!("Page {}: attempt {} returned an empty narration", slide.page_num, attempt + 1);
                last_err = Some("empty narration returned".to_string());
                last_was_timeout = false;
            }
            Ok(Err(e)) => {
                warn!("Page {}: attempt {} failed — {}", slide.page_num, attempt + 1, e);
                last_err = Some(e.to_string());
                last_was_timeout = false;
            }
            Err(_) => {
                warn!(
                    "Page {}: attempt {} timed out after {}s",
                    slide.page_num,
                    attempt + 1,
                    config.api_timeout_secs
                );
                last_err = Some(format!("timed out after {}s", config.api_timeout_secs));
                last_was_timeout = true;
            }
        }
    }

    // All attempts exhausted.
    let error = if last_was_timeout {
        PageError::Timeout {
            page: slide.page_num,
            secs: config.api_timeout_secs,
        }
    } else {
        PageError::NarrationFailed {
            page: slide.page_num,
            attempts: config.retry.max_attempts,
            detail: last_err.unwrap_or_else(|| "unknown error".to_string()),
        }
    };

    PageNarration {
        page_num: slide.page_num,
        outcome: NarrationOutcome::Failed { error },
        duration_ms: started.elapsed().as_millis() as u64,
        attempts: config.retry.max_attempts,
        input_tokens: 0,
        output_tokens: 0,
    }
}
