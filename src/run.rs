//! The run orchestrator: one deck in, one report (and usually a guide) out.
//!
//! A run walks a fixed state machine — `Idle → Converting → Narrating(i)
//! → Reporting → Done`, with `Aborted` reachable from any in-progress
//! state — and processes pages strictly in deck order. Order matters:
//! page i's prompt is built from the context as it stands right after
//! page i-1's extraction, so there is no concurrency to win here, only
//! coherence to lose.
//!
//! ## Ownership and failure boundaries
//!
//! Everything mutable — the rolling context, the page results, the temp
//! slide directory — is owned by the run itself, never shared. Per-page
//! failures are absorbed into the page's result; only deck-level problems
//! (unreadable input, rasterisation, report write) abort. The temp
//! directory is a [`tempfile::TempDir`], so slide images are removed on
//! every exit path, including panics and cancellation.
//!
//! ## Cancellation
//!
//! The cancel flag is cooperative and checked between pages — a page
//! already mid-flight finishes its attempt, then the run aborts, cleans
//! up, and reports how far it got.

use crate::backend::{LlmBackend, NarrationBackend};
use crate::config::NarrationConfig;
use crate::error::DecktalkError;
use crate::events::{EventSink, RunEvent, RunState};
use crate::output::{NarrationOutcome, PageNarration, RunOutput, RunStats};
use crate::pipeline::classify::{classify_file, PageKind};
use crate::pipeline::encode::{encode_slide, EncodedSlide};
use crate::pipeline::extract::update_context;
use crate::pipeline::narrate::narrate_slide;
use crate::pipeline::{input, render};
use crate::prompts::{FALLBACK_PROJECT_CONTEXT, FIRST_PAGE_BRIEF};
use crate::report;
use crate::{context::NarrationContext, guide};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

/// Knobs the front end holds while a run executes: where status updates
/// go and how to ask the worker to stop.
#[derive(Debug, Clone, Default)]
pub struct RunControls {
    pub events: EventSink,
    pub cancel: Arc<AtomicBool>,
}

impl RunControls {
    /// Controls wired to a status channel; returns the receiving half.
    pub fn with_channel() -> (Self, tokio::sync::mpsc::UnboundedReceiver<RunEvent>) {
        let (events, rx) = EventSink::channel();
        (
            Self {
                events,
                cancel: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }
}

/// A narration session: a backend plus the one-run-at-a-time guard.
///
/// The session can be shared (`Arc<Narrator>`) between a front end and a
/// worker task; overlapping [`Narrator::run`] calls are rejected with
/// [`DecktalkError::RunInProgress`] rather than interleaved.
pub struct Narrator {
    backend: Arc<dyn NarrationBackend>,
    run_active: AtomicBool,
}

impl Narrator {
    /// Build a session around any backend (mock backends included).
    pub fn new(backend: Arc<dyn NarrationBackend>) -> Self {
        Self {
            backend,
            run_active: AtomicBool::new(false),
        }
    }

    /// Build a session with the production LLM backend, resolving the
    /// provider from config and environment.
    pub fn from_config(config: &NarrationConfig) -> Result<Self, DecktalkError> {
        Ok(Self::new(Arc::new(LlmBackend::from_config(config)?)))
    }

    /// Execute a full run over `deck_path`.
    ///
    /// Returns the run output on success; `Err` means the run aborted
    /// (input rejected, rasterisation failed, report unwritable, or
    /// cancelled). Either way a terminal event is posted and the temp
    /// slide directory is gone by the time this returns.
    pub async fn run(
        &self,
        deck_path: impl AsRef<Path>,
        config: &NarrationConfig,
        controls: RunControls,
    ) -> Result<RunOutput, DecktalkError> {
        if self.run_active.swap(true, Ordering::SeqCst) {
            return Err(DecktalkError::RunInProgress);
        }
        let _guard = ActiveRunGuard(&self.run_active);

        let result = self
            .run_inner(deck_path.as_ref(), config, &controls)
            .await;

        if let Err(e) = &result {
            controls.events.post(RunEvent::StateChanged(RunState::Aborted));
            controls.events.post(RunEvent::Finished {
                state: RunState::Aborted,
                summary: e.to_string(),
            });
        }
        result
    }

    async fn run_inner(
        &self,
        deck_path: &Path,
        config: &NarrationConfig,
        controls: &RunControls,
    ) -> Result<RunOutput, DecktalkError> {
        let total_start = Instant::now();
        let events = &controls.events;

        // ── Converting ───────────────────────────────────────────────────
        events.post(RunEvent::StateChanged(RunState::Converting));

        let deck_path = input::validate_deck(deck_path, config.max_input_mb)?;
        let deck_name = deck_stem(&deck_path);
        info!("Starting narration run: {}", deck_path.display());

        let metadata = render::extract_metadata(&deck_path).await?;
        info!("Deck has {} pages", metadata.page_count);

        let temp_dir = tempfile::Builder::new()
            .prefix("decktalk-slides-")
            .tempdir()
            .map_err(|e| DecktalkError::Internal(format!("tempdir: {e}")))?;

        let render_start = Instant::now();
        let rendered =
            render::render_deck(&deck_path, config.max_rendered_pixels, config.preview_pages)
                .await?;
        let render_duration_ms = render_start.elapsed().as_millis() as u64;

        let slides: Vec<EncodedSlide> = rendered
            .iter()
            .map(|page| encode_slide(page, config, temp_dir.path()))
            .collect::<Result<_, _>>()?;
        drop(rendered);

        events.post(RunEvent::Log(format!(
            "Rendered {} slides in {}ms",
            slides.len(),
            render_duration_ms
        )));

        // ── Classifying & narrating ──────────────────────────────────────
        let narration_start = Instant::now();
        let mut context = NarrationContext::new();
        let narrations = narrate_pages(
            self.backend.as_ref(),
            &slides,
            config,
            &mut context,
            events,
            &controls.cancel,
        )
        .await?;
        let narration_duration_ms = narration_start.elapsed().as_millis() as u64;

        // ── Reporting ────────────────────────────────────────────────────
        events.post(RunEvent::StateChanged(RunState::Reporting));

        let out_dir = output_dir(config, &deck_path);
        let now = Local::now();
        let effective_context = config
            .effective_context()
            .unwrap_or(FALLBACK_PROJECT_CONTEXT);

        let report_path = out_dir.join(report::report_file_name(&deck_name, now));
        let report_text = report::render_report(&deck_name, effective_context, &narrations, now);
        report::write_report(&report_path, &report_text).await?;
        events.post(RunEvent::Log(format!(
            "Report saved: {}",
            report_path.display()
        )));

        let guide_path = if config.build_guide {
            let path = out_dir.join(guide::guide_file_name(&deck_name));
            let sections = guide::collect_sections(&narrations, &slides);
            let name = deck_name.clone();
            let target = path.clone();
            let guide_result = tokio::task::spawn_blocking(move || {
                guide::render_guide(&name, &sections, &target)
            })
            .await
            .map_err(|e| DecktalkError::Internal(format!("Guide task panicked: {e}")))?;

            match guide_result {
                Ok(()) => {
                    events.post(RunEvent::Log(format!("Guide saved: {}", path.display())));
                    Some(path)
                }
                Err(e) => {
                    // The report already exists; a missing guide is an
                    // inconvenience, not a failed run.
                    warn!("Guide generation failed: {e}");
                    events.post(RunEvent::Log(format!("Guide generation failed: {e}")));
                    None
                }
            }
        } else {
            None
        };

        // ── Done ─────────────────────────────────────────────────────────
        let stats = tally_stats(
            &narrations,
            render_duration_ms,
            narration_duration_ms,
            total_start.elapsed().as_millis() as u64,
        );
        info!("Run complete: {}", stats.summary());

        events.post(RunEvent::StateChanged(RunState::Done));
        events.post(RunEvent::Finished {
            state: RunState::Done,
            summary: stats.summary(),
        });

        // temp_dir drops here: slide images are removed on every path out
        // of this function, including the ? returns above.
        drop(temp_dir);

        Ok(RunOutput {
            narrations,
            metadata,
            stats,
            report_path,
            guide_path,
        })
    }
}

/// Resets the run-in-progress flag even if the run unwinds.
struct ActiveRunGuard<'a>(&'a AtomicBool);

impl Drop for ActiveRunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The page loop: classify, narrate, fold context — strictly in order.
///
/// Returns one [`PageNarration`] per slide, in input order. The only
/// error out of here is [`DecktalkError::Cancelled`]; everything that can
/// go wrong with a single page stays inside that page's entry.
async fn narrate_pages(
    backend: &dyn NarrationBackend,
    slides: &[EncodedSlide],
    config: &NarrationConfig,
    context: &mut NarrationContext,
    events: &EventSink,
    cancel: &AtomicBool,
) -> Result<Vec<PageNarration>, DecktalkError> {
    let total = slides.len();
    let project_context = config
        .effective_context()
        .unwrap_or(FALLBACK_PROJECT_CONTEXT);

    let mut narrations = Vec::with_capacity(total);

    for (i, slide) in slides.iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            info!("Cancel requested; stopping before page {}", slide.page_num);
            return Err(DecktalkError::Cancelled {
                completed: i,
                total,
            });
        }

        events.post(RunEvent::StateChanged(RunState::Narrating {
            page: slide.page_num,
            total,
        }));
        events.post(RunEvent::PageStarted {
            page: slide.page_num,
            total,
        });

        let kind = classify_file(
            &slide.jpeg_path,
            config.dark_luma_cutoff,
            config.text_ratio_threshold,
        );

        let result = match kind {
            PageKind::TextDominant => {
                info!("Page {} skipped (text-dominant)", slide.page_num);
                PageNarration {
                    page_num: slide.page_num,
                    outcome: NarrationOutcome::SkippedTextPage,
                    duration_ms: 0,
                    attempts: 0,
                    input_tokens: 0,
                    output_tokens: 0,
                }
            }
            PageKind::Visual => {
                // The very first narrated page has nothing to recap; every
                // later one gets the rendered brief.
                let brief = if context.recent_narrations().is_empty() {
                    FIRST_PAGE_BRIEF.to_string()
                } else {
                    context.render_brief()
                };

                let result =
                    narrate_slide(backend, slide, project_context, &brief, config).await;

                if let Some(text) = result.narration_text() {
                    update_context(
                        backend,
                        slide.page_num,
                        text,
                        context,
                        config.api_timeout_secs,
                    )
                    .await;
                }
                result
            }
        };

        match &result.outcome {
            NarrationOutcome::Narrated { text } => events.post(RunEvent::PageNarrated {
                page: slide.page_num,
                total,
                chars: text.len(),
            }),
            NarrationOutcome::SkippedTextPage => events.post(RunEvent::PageSkipped {
                page: slide.page_num,
                total,
            }),
            NarrationOutcome::Failed { error } => events.post(RunEvent::PageFailed {
                page: slide.page_num,
                total,
                error: error.to_string(),
            }),
        }
        narrations.push(result);

        // Preview runs pace themselves so a quick smoke test over a live
        // API does not trip rate limits.
        if config.preview_pages.is_some() && i + 1 < total && config.preview_pause_ms > 0 {
            sleep(Duration::from_millis(config.preview_pause_ms)).await;
        }
    }

    Ok(narrations)
}

/// Deck file stem for report/guide naming.
fn deck_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "deck".to_string())
}

/// Output directory: configured, else next to the deck.
fn output_dir(config: &NarrationConfig, deck_path: &Path) -> PathBuf {
    config
        .output_dir
        .clone()
        .or_else(|| deck_path.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Fold the per-page results into run statistics.
fn tally_stats(
    narrations: &[PageNarration],
    render_duration_ms: u64,
    narration_duration_ms: u64,
    total_duration_ms: u64,
) -> RunStats {
    let mut stats = RunStats {
        total_pages: narrations.len(),
        render_duration_ms,
        narration_duration_ms,
        total_duration_ms,
        ..Default::default()
    };
    for n in narrations {
        match &n.outcome {
            NarrationOutcome::Narrated { .. } => stats.narrated_pages += 1,
            NarrationOutcome::SkippedTextPage => stats.skipped_pages += 1,
            NarrationOutcome::Failed { .. } => stats.failed_pages += 1,
        }
        stats.total_input_tokens += n.input_tokens;
        stats.total_output_tokens += n.output_tokens;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendResponse, NarrationBackend};
    use crate::config::RetryPolicy;
    use crate::error::BackendError;
    use crate::pipeline::render::RenderedPage;
    use async_trait::async_trait;
    use image::{DynamicImage, GrayImage, Luma};
    use std::sync::Mutex;

    /// Backend that narrates deterministically and extracts a fixed
    /// element per page, with optional scripted narration failures.
    struct FakeBackend {
        /// Pages whose narration should fail `fail_times` before succeeding.
        narrate_failures: Mutex<Vec<Result<(), ()>>>,
        extraction_reply: String,
        narrate_calls: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn happy() -> Self {
            Self {
                narrate_failures: Mutex::new(Vec::new()),
                extraction_reply: r#"{"key_elements": {"motif": "repeating arc"}, "design_decisions": ["keep it sparse"], "connections": []}"#.into(),
                narrate_calls: Mutex::new(Vec::new()),
            }
        }

        fn with_script(script: Vec<Result<(), ()>>) -> Self {
            let mut b = Self::happy();
            b.narrate_failures = Mutex::new(script);
            b
        }
    }

    #[async_trait]
    impl NarrationBackend for FakeBackend {
        async fn narrate_page(
            &self,
            system_prompt: &str,
            _user_prompt: &str,
            _image_base64: &str,
            _mime_type: &str,
        ) -> Result<BackendResponse, BackendError> {
            self.narrate_calls
                .lock()
                .unwrap()
                .push(system_prompt.to_string());
            let mut script = self.narrate_failures.lock().unwrap();
            if !script.is_empty() {
                if script.remove(0).is_err() {
                    return Err(BackendError("scripted failure".into()));
                }
            }
            let n = self.narrate_calls.lock().unwrap().len();
            Ok(BackendResponse {
                text: format!("KEY POINT: commentary number {n}"),
                input_tokens: 1000,
                output_tokens: 80,
            })
        }

        async fn extract_json(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
        ) -> Result<BackendResponse, BackendError> {
            Ok(BackendResponse {
                text: self.extraction_reply.clone(),
                input_tokens: 200,
                output_tokens: 60,
            })
        }
    }

    /// Build a slide set on disk: `dark` pages render as dense text,
    /// others as light visuals.
    fn make_slides(dir: &Path, total: usize, text_pages: &[usize]) -> Vec<EncodedSlide> {
        let config = NarrationConfig::default();
        (1..=total)
            .map(|n| {
                let luma = if text_pages.contains(&n) { 0u8 } else { 255u8 };
                let page = RenderedPage {
                    page_num: n,
                    image: DynamicImage::ImageLuma8(GrayImage::from_pixel(80, 60, Luma([luma]))),
                };
                encode_slide(&page, &config, dir).unwrap()
            })
            .collect()
    }

    fn fast_config() -> NarrationConfig {
        let mut config = NarrationConfig::default();
        config.retry = RetryPolicy {
            max_attempts: 3,
            delay_ms: 0,
        };
        config
    }

    #[tokio::test]
    async fn visual_pages_narrated_text_pages_skipped_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let slides = make_slides(dir.path(), 3, &[2]);
        let backend = FakeBackend::happy();
        let mut context = NarrationContext::new();

        let narrations = narrate_pages(
            &backend,
            &slides,
            &fast_config(),
            &mut context,
            &EventSink::disabled(),
            &AtomicBool::new(false),
        )
        .await
        .unwrap();

        assert_eq!(narrations.len(), 3);
        assert_eq!(
            narrations.iter().map(|n| n.page_num).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(matches!(narrations[0].outcome, NarrationOutcome::Narrated { .. }));
        assert!(matches!(narrations[1].outcome, NarrationOutcome::SkippedTextPage));
        assert!(matches!(narrations[2].outcome, NarrationOutcome::Narrated { .. }));

        // The narrator was only invoked for the two visual pages.
        assert_eq!(backend.narrate_calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn first_narrated_page_gets_first_page_brief_then_accumulated_context() {
        let dir = tempfile::tempdir().unwrap();
        let slides = make_slides(dir.path(), 2, &[]);
        let backend = FakeBackend::happy();
        let mut context = NarrationContext::new();

        narrate_pages(
            &backend,
            &slides,
            &fast_config(),
            &mut context,
            &EventSink::disabled(),
            &AtomicBool::new(false),
        )
        .await
        .unwrap();

        let calls = backend.narrate_calls.lock().unwrap();
        assert!(calls[0].contains(FIRST_PAGE_BRIEF));
        // Page 2's prompt carries page 1's narration and the extracted element.
        assert!(calls[1].contains("commentary number 1"));
        assert!(calls[1].contains("motif"));
        assert!(!calls[1].contains(FIRST_PAGE_BRIEF));
    }

    #[tokio::test]
    async fn page_failure_is_recorded_and_run_continues() {
        let dir = tempfile::tempdir().unwrap();
        let slides = make_slides(dir.path(), 2, &[]);
        // Page 1 exhausts all three attempts; page 2 succeeds.
        let backend = FakeBackend::with_script(vec![Err(()), Err(()), Err(()), Ok(())]);
        let mut context = NarrationContext::new();

        let narrations = narrate_pages(
            &backend,
            &slides,
            &fast_config(),
            &mut context,
            &EventSink::disabled(),
            &AtomicBool::new(false),
        )
        .await
        .unwrap();

        assert!(matches!(narrations[0].outcome, NarrationOutcome::Failed { .. }));
        assert_eq!(narrations[0].attempts, 3);
        assert!(matches!(narrations[1].outcome, NarrationOutcome::Narrated { .. }));

        // The failed page contributed nothing to the context, so page 2
        // still narrates as the first page of the walkthrough.
        let calls = backend.narrate_calls.lock().unwrap();
        assert!(calls[3].contains(FIRST_PAGE_BRIEF));
    }

    #[tokio::test]
    async fn retried_page_is_indistinguishable_on_eventual_success() {
        let dir = tempfile::tempdir().unwrap();
        let slides = make_slides(dir.path(), 1, &[]);
        let backend = FakeBackend::with_script(vec![Err(()), Err(()), Ok(())]);
        let mut context = NarrationContext::new();

        let narrations = narrate_pages(
            &backend,
            &slides,
            &fast_config(),
            &mut context,
            &EventSink::disabled(),
            &AtomicBool::new(false),
        )
        .await
        .unwrap();

        // Narrated like any other page; retries left no visible scar.
        assert!(matches!(narrations[0].outcome, NarrationOutcome::Narrated { .. }));
        assert!(narrations[0].narration_text().unwrap().contains("commentary"));
    }

    #[tokio::test]
    async fn cancellation_between_pages_stops_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let slides = make_slides(dir.path(), 3, &[]);
        let backend = FakeBackend::happy();
        let mut context = NarrationContext::new();

        // Pre-set: the loop must bail before page 1.
        let cancel = AtomicBool::new(true);
        let result = narrate_pages(
            &backend,
            &slides,
            &fast_config(),
            &mut context,
            &EventSink::disabled(),
            &cancel,
        )
        .await;

        match result {
            Err(DecktalkError::Cancelled { completed, total }) => {
                assert_eq!(completed, 0);
                assert_eq!(total, 3);
            }
            other => panic!("expected Cancelled, got {other:?}"),
        }
        assert_eq!(backend.narrate_calls.lock().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn events_track_every_page() {
        let dir = tempfile::tempdir().unwrap();
        let slides = make_slides(dir.path(), 3, &[2]);
        let backend = FakeBackend::happy();
        let mut context = NarrationContext::new();
        let (events, mut rx) = EventSink::channel();

        narrate_pages(
            &backend,
            &slides,
            &fast_config(),
            &mut context,
            &events,
            &AtomicBool::new(false),
        )
        .await
        .unwrap();
        drop(events);

        let mut narrated = 0;
        let mut skipped = 0;
        let mut started = 0;
        while let Some(event) = rx.recv().await {
            match event {
                RunEvent::PageStarted { .. } => started += 1,
                RunEvent::PageNarrated { .. } => narrated += 1,
                RunEvent::PageSkipped { .. } => skipped += 1,
                _ => {}
            }
        }
        assert_eq!(started, 3);
        assert_eq!(narrated, 2);
        assert_eq!(skipped, 1);
    }

    #[tokio::test]
    async fn end_to_end_report_and_guide_sections_for_mixed_deck() {
        let dir = tempfile::tempdir().unwrap();
        let slides = make_slides(dir.path(), 3, &[2]);
        let backend = FakeBackend::happy();
        let mut context = NarrationContext::new();

        let narrations = narrate_pages(
            &backend,
            &slides,
            &fast_config(),
            &mut context,
            &EventSink::disabled(),
            &AtomicBool::new(false),
        )
        .await
        .unwrap();

        // Report: three lines, with a distinct skip marker in the middle.
        let text = report::render_report("demo", "ctx", &narrations, Local::now());
        assert!(text.contains("Page 1: KEY POINT:"));
        assert!(text.contains("Page 2: [skipped — text-dominant page]"));
        assert!(text.contains("Page 3: KEY POINT:"));

        // Guide: exactly the two narrated pages.
        let sections = guide::collect_sections(&narrations, &slides);
        assert_eq!(
            sections.iter().map(|s| s.page_num).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    #[tokio::test]
    async fn overlapping_runs_are_rejected() {
        let narrator = Narrator::new(Arc::new(FakeBackend::happy()));
        // Simulate a run in flight.
        narrator.run_active.store(true, Ordering::SeqCst);

        let result = narrator
            .run(
                "/nonexistent.pdf",
                &NarrationConfig::default(),
                RunControls::default(),
            )
            .await;
        assert!(matches!(result, Err(DecktalkError::RunInProgress)));

        // Once released, the guard admits the next run (which then fails
        // on the missing file, proving it got past the guard).
        narrator.run_active.store(false, Ordering::SeqCst);
        let result = narrator
            .run(
                "/nonexistent.pdf",
                &NarrationConfig::default(),
                RunControls::default(),
            )
            .await;
        assert!(matches!(result, Err(DecktalkError::FileNotFound { .. })));
        assert!(!narrator.run_active.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn aborted_run_posts_terminal_event() {
        let narrator = Narrator::new(Arc::new(FakeBackend::happy()));
        let (controls, mut rx) = RunControls::with_channel();

        let result = narrator
            .run("/nonexistent.pdf", &NarrationConfig::default(), controls)
            .await;
        assert!(result.is_err());

        let mut saw_aborted = false;
        while let Ok(event) = rx.try_recv() {
            if let RunEvent::Finished { state, .. } = event {
                saw_aborted = state == RunState::Aborted;
            }
        }
        assert!(saw_aborted);
    }

    #[test]
    fn stats_tally_counts_each_outcome() {
        use crate::error::PageError;
        let narrations = vec![
            PageNarration {
                page_num: 1,
                outcome: NarrationOutcome::Narrated { text: "a".into() },
                duration_ms: 10,
                attempts: 1,
                input_tokens: 100,
                output_tokens: 10,
            },
            PageNarration {
                page_num: 2,
                outcome: NarrationOutcome::SkippedTextPage,
                duration_ms: 0,
                attempts: 0,
                input_tokens: 0,
                output_tokens: 0,
            },
            PageNarration {
                page_num: 3,
                outcome: NarrationOutcome::Failed {
                    error: PageError::NarrationFailed {
                        page: 3,
                        attempts: 3,
                        detail: "x".into(),
                    },
                },
                duration_ms: 50,
                attempts: 3,
                input_tokens: 0,
                output_tokens: 0,
            },
        ];

        let stats = tally_stats(&narrations, 5, 60, 70);
        assert_eq!(stats.total_pages, 3);
        assert_eq!(stats.narrated_pages, 1);
        assert_eq!(stats.skipped_pages, 1);
        assert_eq!(stats.failed_pages, 1);
        assert_eq!(stats.total_input_tokens, 100);
        assert_eq!(stats.render_duration_ms, 5);
    }
}
