//! Resolution run state machine
//!
//! ```text
//! Idle -> ComputingMidpoint -> FetchingCandidates -> EvaluatingCandidate(0)
//!      -> ... -> EvaluatingCandidate(n-1) -> Finalizing -> Succeeded
//! ```
//!
//! Any non-terminal state may move to `Failed`. `Succeeded` and `Failed` are
//! terminal; a new run starts a new [`ResolutionRun`] from `Idle`.

use crate::evaluator::BestSoFar;
use crate::model::TripId;
use crate::progress::ProgressEvent;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Status of one resolution run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum RunStatus {
    /// Created, nothing done yet
    Idle,
    /// Reading participants and averaging their starting points
    ComputingMidpoint,
    /// Waiting on the places provider
    FetchingCandidates,
    /// Scoring the candidate at this zero-based index
    EvaluatingCandidate(usize),
    /// Expanding photos and writing the winner
    Finalizing,
    /// Winner persisted
    Succeeded,
    /// Run aborted with this reason
    Failed(String),
}

impl RunStatus {
    /// `Succeeded` or `Failed`
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }

    /// Pipeline stage this status belongs to
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Idle => Stage::WaitingForTrip,
            Self::ComputingMidpoint => Stage::ComputingMidpoint,
            Self::FetchingCandidates => Stage::FetchingCandidates,
            Self::EvaluatingCandidate(_) => Stage::EvaluatingCandidates,
            Self::Finalizing | Self::Succeeded | Self::Failed(_) => Stage::Finalizing,
        }
    }

    fn can_move_to(&self, next: &RunStatus) -> bool {
        match (self, next) {
            (from, _) if from.is_terminal() => false,
            (_, Self::Failed(_))
            | (Self::Idle, Self::ComputingMidpoint)
            | (Self::ComputingMidpoint, Self::FetchingCandidates)
            | (Self::FetchingCandidates, Self::EvaluatingCandidate(0))
            | (Self::EvaluatingCandidate(_), Self::Finalizing)
            | (Self::Finalizing, Self::Succeeded) => true,
            (Self::EvaluatingCandidate(i), Self::EvaluatingCandidate(j)) => *j == i + 1,
            _ => false,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::ComputingMidpoint => write!(f, "computing midpoint"),
            Self::FetchingCandidates => write!(f, "fetching candidates"),
            Self::EvaluatingCandidate(i) => write!(f, "evaluating candidate {}", i + 1),
            Self::Finalizing => write!(f, "finalizing"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Pipeline stage a fatal error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Stage {
    WaitingForTrip,
    LocatingParticipants,
    ComputingMidpoint,
    FetchingCandidates,
    EvaluatingCandidates,
    Finalizing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::WaitingForTrip => "waiting for a concurrent run on the same trip",
            Self::LocatingParticipants => "locating participants",
            Self::ComputingMidpoint => "computing midpoint",
            Self::FetchingCandidates => "fetching candidates",
            Self::EvaluatingCandidates => "evaluating candidates",
            Self::Finalizing => "finalizing",
        })
    }
}

/// Rejected state change
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid run transition from `{from}` to `{to}`")]
pub struct InvalidTransition {
    /// State the run was in
    pub from: RunStatus,
    /// State that was requested
    pub to: RunStatus,
}

/// In-memory state of one resolution run. Never persisted.
#[derive(Debug, Clone)]
pub struct ResolutionRun {
    trip_id: TripId,
    status: RunStatus,
    completed: usize,
    total: usize,
    best_so_far: Option<BestSoFar>,
}

impl ResolutionRun {
    /// Fresh run in `Idle`
    pub fn new(trip_id: impl Into<TripId>) -> Self {
        Self {
            trip_id: trip_id.into(),
            status: RunStatus::Idle,
            completed: 0,
            total: 0,
            best_so_far: None,
        }
    }

    /// Trip being resolved
    #[must_use]
    pub fn trip_id(&self) -> &str {
        &self.trip_id
    }

    /// Current status
    #[must_use]
    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    /// `completed / total`, 0.0 before the first candidate is scored
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Lowest-cost candidate scored so far
    #[must_use]
    pub fn best_so_far(&self) -> Option<&BestSoFar> {
        self.best_so_far.as_ref()
    }

    /// Move to `next`, rejecting edges the state machine does not have
    pub fn transition_to(&mut self, next: RunStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_move_to(&next) {
            return Err(InvalidTransition {
                from: self.status.clone(),
                to: next,
            });
        }
        tracing::trace!(trip_id = %self.trip_id, from = %self.status, to = %next, "Run transition");
        self.status = next;
        Ok(())
    }

    /// Set the number of candidates to be scored
    pub fn begin_evaluation(&mut self, total: usize) {
        self.total = total;
        self.completed = 0;
    }

    /// Record one more scored candidate and the running best after it
    pub fn record_evaluated(&mut self, best: Option<BestSoFar>) {
        self.completed = (self.completed + 1).min(self.total);
        self.best_so_far = best;
    }

    /// Progress event describing the current state
    #[must_use]
    pub fn event(&self, message: impl Into<String>) -> ProgressEvent {
        ProgressEvent {
            fraction: self.progress_fraction(),
            message: message.into(),
            status: self.status.clone(),
            completed: self.completed,
            total: self.total,
        }
    }
}
