//! Prompt templates for narration and context extraction.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the narrator's voice or the
//!    extraction schema requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect assembled prompts directly
//!    without spinning up a real model, making prompt regressions easy to
//!    catch.

/// Literal line prefix the narrator uses for the slide's single key message.
pub const HEADLINE_MARKER: &str = "KEY POINT:";

/// Literal line prefix for supporting detail and discussion ammunition.
pub const DETAILS_MARKER: &str = "DETAILS:";

/// Literal line prefix for the segue into the next slide.
pub const TRANSITION_MARKER: &str = "TRANSITION:";

/// Context brief used for the very first narrated page of a run, when
/// there is nothing accumulated to summarise yet.
pub const FIRST_PAGE_BRIEF: &str = "This is the first slide of the presentation.";

/// Project context used when the operator supplied none (or left the
/// placeholder untouched).
pub const FALLBACK_PROJECT_CONTEXT: &str = "A general walkthrough of the presentation deck.";

/// User-turn text accompanying the slide image on every narration call.
pub const NARRATION_USER_PROMPT: &str =
    "Talk through this slide plainly and to the point, as you would in the room.";

/// System prompt for the structured-extraction call.
///
/// The JSON-only constraint lives here: the provider seam exposes no
/// response-format switch, so the contract is carried by the prompt and
/// enforced by the typed parse on our side.
pub const EXTRACTOR_SYSTEM_PROMPT: &str = "You are a parser that emits only valid JSON. \
Never add commentary, markdown fences, or trailing text. \
Always double-check that every quote and bracket is closed.";

/// Build the narrator's system prompt for one page.
///
/// `project_context` is the operator's effective description (or
/// [`FALLBACK_PROJECT_CONTEXT`]); `brief` is the rendered
/// [`crate::context::NarrationContext`] (or [`FIRST_PAGE_BRIEF`]).
pub fn narrator_system_prompt(project_context: &str, brief: &str) -> String {
    format!(
        r#"You are an experienced art director presenting a design concept to a client in an informal setting. Speak naturally, in the first person, and keep it short.

Project context: {project_context}

What we have discussed so far:
{brief}

Structure your commentary as plain lines, using these exact prefixes:
{HEADLINE_MARKER} the one thing this slide must land
{DETAILS_MARKER} supporting points worth raising if the client digs in
{TRANSITION_MARKER} a one-sentence bridge to the next slide

Do not mention slide numbers, do not describe the layout mechanically, and do not wrap the output in markdown."#
    )
}

/// Build the user prompt for the structured-extraction call.
///
/// Asks for the exact three-field shape [`crate::context::ContextUpdate`]
/// deserialises.
pub fn extraction_prompt(page_number: usize, narration: &str) -> String {
    format!(
        r#"Analyse this commentary for slide {page_number} and return strictly valid JSON with this structure:
{{
    "key_elements": {{"element_name": "one-line description"}},
    "design_decisions": ["decision 1", "decision 2"],
    "connections": ["connection 1", "connection 2"]
}}

Commentary to analyse:
{narration}"#
    )
}
