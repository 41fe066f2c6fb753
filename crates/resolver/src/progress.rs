//! Progress reporting
//!
//! A run reports every state change to a [`ProgressSink`]. Events are emitted
//! in order from the task driving the run, so `fraction` and `completed` never
//! decrease within one run.

use crate::run::RunStatus;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One progress update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Candidates scored over candidates found, 0.0 to 1.0
    pub fraction: f64,
    /// Human-readable status line
    pub message: String,
    /// Run state when the event was emitted
    pub status: RunStatus,
    /// Candidates scored so far
    pub completed: usize,
    /// Candidates found
    pub total: usize,
}

/// Receiver of progress updates
pub trait ProgressSink: Send + Sync {
    /// Called once per update, in order
    fn report(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event);
    }
}

impl ProgressSink for mpsc::UnboundedSender<ProgressEvent> {
    fn report(&self, event: &ProgressEvent) {
        // A dropped receiver means nobody is listening any more.
        let _ = self.send(event.clone());
    }
}

/// Discards every update
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn event(fraction: f64) -> ProgressEvent {
        ProgressEvent {
            fraction,
            message: "Evaluated Harbour Grill".into(),
            status: RunStatus::EvaluatingCandidate(0),
            completed: 1,
            total: 2,
        }
    }

    #[test]
    fn test_closure_sink() {
        let seen = Mutex::new(Vec::new());
        let sink = |e: &ProgressEvent| seen.lock().unwrap().push(e.fraction);

        sink.report(&event(0.5));
        sink.report(&event(1.0));

        assert_eq!(*seen.lock().unwrap(), vec![0.5, 1.0]);
    }

    #[tokio::test]
    async fn test_channel_sink() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.report(&event(0.5));
        drop(tx);

        assert_eq!(rx.recv().await.map(|e| e.fraction), Some(0.5));
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_channel_sink_ignores_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel::<ProgressEvent>();
        drop(rx);
        tx.report(&event(0.5));
    }

    #[test]
    fn test_no_progress() {
        NoProgress.report(&event(0.5));
    }
}
