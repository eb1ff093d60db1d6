//! Run states and the one-directional status channel.
//!
//! The run executes on a background worker; whatever front end launched
//! it (the CLI, a GUI shell, a test harness) watches from its own task.
//! Communication is strictly one-way: the worker posts [`RunEvent`]s into
//! an unbounded channel and never waits on the consumer, and the consumer
//! only ever reads snapshots. Neither side can stall the other — if the
//! receiver is dropped mid-run, posts become no-ops and the worker
//! finishes on its own.

use serde::Serialize;
use tokio::sync::mpsc;

/// Where the run currently is.
///
/// The orchestrator walks `Idle → Converting → Narrating(i) → Reporting →
/// Done`; `Aborted` is reachable from any in-progress state on an
/// unrecoverable error or cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Converting,
    Narrating { page: usize, total: usize },
    Reporting,
    Done,
    Aborted,
}

/// A status update posted by the worker.
#[derive(Debug, Clone)]
pub enum RunEvent {
    StateChanged(RunState),
    PageStarted {
        page: usize,
        total: usize,
    },
    PageNarrated {
        page: usize,
        total: usize,
        chars: usize,
    },
    PageSkipped {
        page: usize,
        total: usize,
    },
    PageFailed {
        page: usize,
        total: usize,
        error: String,
    },
    /// Free-form progress note (mirrors the run's log line).
    Log(String),
    /// Terminal event: the run reached `Done` or `Aborted`.
    Finished {
        state: RunState,
        summary: String,
    },
}

/// Sending half of the status channel, as held by the worker.
///
/// A disabled sink (no channel attached) is valid and free; every `post`
/// is then a no-op. Posting never blocks and never fails visibly — a
/// closed channel means nobody is watching, which is not the worker's
/// problem.
#[derive(Debug, Clone, Default)]
pub struct EventSink(Option<mpsc::UnboundedSender<RunEvent>>);

impl EventSink {
    /// Create a connected sink and its receiving half.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RunEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(Some(tx)), rx)
    }

    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self(None)
    }

    pub fn post(&self, event: RunEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_arrive_in_post_order() {
        let (sink, mut rx) = EventSink::channel();
        sink.post(RunEvent::StateChanged(RunState::Converting));
        sink.post(RunEvent::PageStarted { page: 1, total: 3 });
        sink.post(RunEvent::PageNarrated {
            page: 1,
            total: 3,
            chars: 420,
        });

        assert!(matches!(
            rx.recv().await,
            Some(RunEvent::StateChanged(RunState::Converting))
        ));
        assert!(matches!(
            rx.recv().await,
            Some(RunEvent::PageStarted { page: 1, .. })
        ));
        assert!(matches!(
            rx.recv().await,
            Some(RunEvent::PageNarrated { chars: 420, .. })
        ));
    }

    #[test]
    fn disabled_sink_discards_without_panic() {
        let sink = EventSink::disabled();
        sink.post(RunEvent::Log("nobody listening".into()));
    }

    #[test]
    fn post_after_receiver_dropped_is_a_no_op() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.post(RunEvent::Finished {
            state: RunState::Done,
            summary: "done".into(),
        });
    }
}
