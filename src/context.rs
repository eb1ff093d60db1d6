//! The rolling narration context and its prompt-ready brief.
//!
//! Narration quality across a deck depends on each page's commentary
//! knowing what came before it. [`NarrationContext`] is the per-run
//! aggregate that carries that knowledge: named design elements seen so
//! far, decision statements, and the most recent narrations. It is owned
//! exclusively by one run — created empty, mutated only by the worker
//! between pages, and discarded when the run ends. Nothing here is a
//! process-wide singleton, so sequential runs never bleed into each other.
//!
//! ## Growth shape
//!
//! `key_elements` and `design_decisions` only grow over a run (writes to
//! an existing element name overwrite its description). Only
//! `recent_narrations` evicts, oldest first, past [`RECENT_NARRATIONS_CAP`]
//! entries — the brief must stay short enough to leave prompt room for the
//! page image itself.
//!
//! Narrations are stored in full; truncation happens only when the brief
//! is rendered. Storing previews would silently degrade every later brief.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::VecDeque;

/// How many recent narrations the brief carries.
pub const RECENT_NARRATIONS_CAP: usize = 2;

/// Render-time cap on a single narration inside the brief, in characters.
const BRIEF_NARRATION_CHARS: usize = 500;

/// Accumulated understanding of the deck, updated after each narrated page.
///
/// Field enumeration order in the rendered brief is deterministic:
/// `key_elements` is a `BTreeMap`, so elements list lexicographically by
/// name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrationContext {
    key_elements: BTreeMap<String, String>,
    design_decisions: Vec<String>,
    connections: Vec<String>,
    recent_narrations: VecDeque<String>,
}

impl NarrationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// True before any page has been narrated.
    pub fn is_empty(&self) -> bool {
        self.recent_narrations.is_empty()
            && self.key_elements.is_empty()
            && self.design_decisions.is_empty()
            && self.connections.is_empty()
    }

    pub fn key_elements(&self) -> &BTreeMap<String, String> {
        &self.key_elements
    }

    pub fn design_decisions(&self) -> &[String] {
        &self.design_decisions
    }

    /// Cross-slide connections extracted so far. Recorded for downstream
    /// consumers; not rendered into briefs.
    pub fn connections(&self) -> &[String] {
        &self.connections
    }

    pub fn recent_narrations(&self) -> &VecDeque<String> {
        &self.recent_narrations
    }

    /// Fold an extraction result into the context.
    ///
    /// Element-name collisions overwrite the earlier description; decision
    /// statements and connections append (duplicates allowed).
    pub fn apply(&mut self, update: ContextUpdate) {
        self.key_elements.extend(update.key_elements);
        self.design_decisions.extend(update.design_decisions);
        self.connections.extend(update.connections);
    }

    /// Record a narration, evicting the oldest past the cap.
    pub fn remember_narration(&mut self, narration: impl Into<String>) {
        self.recent_narrations.push_back(narration.into());
        while self.recent_narrations.len() > RECENT_NARRATIONS_CAP {
            self.recent_narrations.pop_front();
        }
    }

    /// Render the context as a short text block for prompt inclusion.
    ///
    /// Fixed order: recent narrations (oldest of the kept two first), then
    /// the key-element catalogue. Empty sections are omitted entirely; an
    /// empty context renders as an empty string (callers substitute the
    /// first-page notice before that can reach a prompt).
    pub fn render_brief(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if !self.recent_narrations.is_empty() {
            parts.push("What we covered on the previous slides:".to_string());
            for narration in &self.recent_narrations {
                parts.push(format!("- {}", truncate_chars(narration, BRIEF_NARRATION_CHARS)));
            }
        }

        if !self.key_elements.is_empty() {
            if !parts.is_empty() {
                parts.push(String::new());
            }
            parts.push("Key design elements so far:".to_string());
            for (name, description) in &self.key_elements {
                parts.push(format!("- {}: {}", name, description));
            }
        }

        parts.join("\n")
    }
}

/// Structured signal extracted from one narration.
///
/// This is the exact shape the extraction prompt asks the model to emit.
/// Every field defaults so a partial response still parses; a response
/// that fails to parse at all leaves the context untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextUpdate {
    #[serde(default)]
    pub key_elements: BTreeMap<String, String>,
    #[serde(default)]
    pub design_decisions: Vec<String>,
    #[serde(default)]
    pub connections: Vec<String>,
}

/// Truncate to at most `max` characters, appending an ellipsis when cut.
/// Operates on character boundaries so multi-byte text never splits.
fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}…", &s[..byte_idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(
        elements: &[(&str, &str)],
        decisions: &[&str],
        connections: &[&str],
    ) -> ContextUpdate {
        ContextUpdate {
            key_elements: elements
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            design_decisions: decisions.iter().map(|s| s.to_string()).collect(),
            connections: connections.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn recent_narrations_never_exceed_cap() {
        let mut ctx = NarrationContext::new();
        for i in 0..10 {
            ctx.remember_narration(format!("narration {i}"));
            assert!(ctx.recent_narrations().len() <= RECENT_NARRATIONS_CAP);
        }
        // Oldest evicted first: only the last two survive.
        let kept: Vec<_> = ctx.recent_narrations().iter().cloned().collect();
        assert_eq!(kept, vec!["narration 8", "narration 9"]);
    }

    #[test]
    fn key_element_collision_overwrites() {
        let mut ctx = NarrationContext::new();
        ctx.apply(update(&[("logo", "old mark")], &[], &[]));
        ctx.apply(update(&[("logo", "new wordmark")], &[], &[]));
        assert_eq!(ctx.key_elements().len(), 1);
        assert_eq!(ctx.key_elements()["logo"], "new wordmark");
    }

    #[test]
    fn design_decisions_append_with_duplicates() {
        let mut ctx = NarrationContext::new();
        ctx.apply(update(&[], &["use the serif face"], &[]));
        ctx.apply(update(&[], &["use the serif face"], &[]));
        assert_eq!(ctx.design_decisions().len(), 2);
    }

    #[test]
    fn brief_renders_sections_in_fixed_order() {
        let mut ctx = NarrationContext::new();
        ctx.remember_narration("First slide sets the palette.");
        ctx.remember_narration("Second slide shows the grid.");
        ctx.apply(update(
            &[("palette", "warm neutrals"), ("grid", "12 columns")],
            &["lead with colour"],
            &[],
        ));

        let brief = ctx.render_brief();
        let narrations_at = brief.find("What we covered").unwrap();
        let elements_at = brief.find("Key design elements").unwrap();
        assert!(narrations_at < elements_at);

        // Oldest of the kept narrations comes first.
        let first = brief.find("First slide").unwrap();
        let second = brief.find("Second slide").unwrap();
        assert!(first < second);

        // BTreeMap iteration: "grid" before "palette".
        let grid = brief.find("- grid:").unwrap();
        let palette = brief.find("- palette:").unwrap();
        assert!(grid < palette);
    }

    #[test]
    fn brief_omits_empty_sections() {
        let mut ctx = NarrationContext::new();
        ctx.remember_narration("Only narration, no elements yet.");
        let brief = ctx.render_brief();
        assert!(brief.contains("What we covered"));
        assert!(!brief.contains("Key design elements"));

        assert_eq!(NarrationContext::new().render_brief(), "");
    }

    #[test]
    fn brief_truncates_long_narrations_at_render_time() {
        let mut ctx = NarrationContext::new();
        let long = "x".repeat(2000);
        ctx.remember_narration(long.clone());

        // Stored in full…
        assert_eq!(ctx.recent_narrations()[0].len(), 2000);
        // …truncated only in the rendered brief.
        let brief = ctx.render_brief();
        assert!(brief.contains('…'));
        assert!(brief.len() < long.len());
    }

    #[test]
    fn truncate_chars_respects_multibyte_boundaries() {
        let s = "déjà vu".repeat(100);
        let out = truncate_chars(&s, 10);
        assert!(out.ends_with('…'));
        assert_eq!(out.chars().count(), 11);
    }

    #[test]
    fn apply_default_update_is_a_no_op() {
        let mut ctx = NarrationContext::new();
        ctx.remember_narration("something");
        let before = ctx.clone();
        ctx.apply(ContextUpdate::default());
        assert_eq!(ctx, before);
    }

    #[test]
    fn partial_update_parses_with_defaults() {
        let parsed: ContextUpdate =
            serde_json::from_str(r#"{"key_elements": {"logo": "a bold monogram"}}"#).unwrap();
        assert_eq!(parsed.key_elements.len(), 1);
        assert!(parsed.design_decisions.is_empty());
        assert!(parsed.connections.is_empty());
    }
}
