//! Context extraction: fold structured signal from a narration into the
//! rolling context.
//!
//! After a slide is narrated, a second, text-only call asks the model to
//! distil the commentary into named elements, decision statements, and
//! connections. The request carries a strict-JSON system prompt, and the
//! response goes through a typed parse into
//! [`crate::context::ContextUpdate`].
//!
//! Nothing in this module can fail a run. A transport error, a timeout,
//! or a response that refuses to parse all take the same explicit no-op
//! path: log a warning, leave the context exactly as it was, move on.
//! The next slide simply narrates against a slightly staler brief.

use crate::backend::NarrationBackend;
use crate::context::{ContextUpdate, NarrationContext};
use crate::prompts;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

/// What happened to the context on this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// The update parsed and was folded in.
    Applied,
    /// Transport/timeout/parse failure; the context was left untouched.
    Skipped,
}

/// Extract signal from `narration` and fold it into `context`.
///
/// On success the context gains the extracted pairs and statements and
/// remembers the narration; on any failure it is left deep-equal to its
/// state before the call.
pub async fn update_context(
    backend: &dyn NarrationBackend,
    page_num: usize,
    narration: &str,
    context: &mut NarrationContext,
    api_timeout_secs: u64,
) -> ExtractionOutcome {
    let user_prompt = prompts::extraction_prompt(page_num, narration);
    let call = backend.extract_json(prompts::EXTRACTOR_SYSTEM_PROMPT, &user_prompt);

    let response = match timeout(Duration::from_secs(api_timeout_secs), call).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            warn!("Page {page_num}: context extraction failed, keeping previous context — {e}");
            return ExtractionOutcome::Skipped;
        }
        Err(_) => {
            warn!("Page {page_num}: context extraction timed out after {api_timeout_secs}s, keeping previous context");
            return ExtractionOutcome::Skipped;
        }
    };

    let update = match parse_update(&response.text) {
        Some(update) => update,
        None => {
            warn!(
                "Page {page_num}: context extraction returned unparseable output, keeping previous context"
            );
            return ExtractionOutcome::Skipped;
        }
    };

    debug!(
        "Page {page_num}: context gains {} elements, {} decisions, {} connections",
        update.key_elements.len(),
        update.design_decisions.len(),
        update.connections.len()
    );

    context.apply(update);
    context.remember_narration(narration);
    ExtractionOutcome::Applied
}

static RE_JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n(.*)\n```\s*$").unwrap());

/// Parse the model's output into a typed update, tolerating the usual
/// misbehaviours: code fences around the object, or prose before and
/// after it. Returns `None` when no valid object can be recovered.
fn parse_update(raw: &str) -> Option<ContextUpdate> {
    let text = raw.trim();
    let text = match RE_JSON_FENCE.captures(text) {
        Some(caps) => caps.get(1).map(|m| m.as_str().trim()).unwrap_or(text),
        None => text,
    };

    if let Ok(update) = serde_json::from_str::<ContextUpdate>(text) {
        return Some(update);
    }

    // Last resort: the outermost brace-delimited span.
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<ContextUpdate>(&text[start..=end]).ok()
}
