//! Resolver errors
//!
//! [`ResolveError`] is fatal for a run. Per-leg travel-time failures never
//! appear here; they are folded into the candidate's score instead.

use crate::model::{TripId, UserId};
use crate::resolver::Resolution;
use crate::run::{InvalidTransition, Stage};
use rendezvous_core::{Error as CoreError, ErrorCode, ErrorReport};
use rendezvous_geo::Coordinate;
use std::fmt;
use thiserror::Error;

/// Result type for resolution runs
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Fatal outcome of a resolution run
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The trip does not exist
    #[error("trip {trip_id} not found")]
    TripNotFound {
        /// Trip that was requested
        trip_id: TripId,
    },

    /// No participant has a usable starting location
    #[error("no participants with valid locations for trip {trip_id}")]
    NoParticipants {
        /// Trip being resolved
        trip_id: TripId,
    },

    /// The places provider failed or timed out
    #[error("candidate retrieval failed for trip {trip_id}: {source}")]
    RetrievalFailed {
        /// Trip being resolved
        trip_id: TripId,
        /// Raw provider failure
        source: ProviderError,
    },

    /// The places provider returned no usable venue. Venues with
    /// out-of-range coordinates are dropped before this check and counted in
    /// `discarded`, so a non-empty provider answer can still end here.
    #[error("no candidates found near {midpoint} for trip {trip_id}{}", discarded_note(.discarded))]
    NoCandidatesFound {
        /// Trip being resolved
        trip_id: TripId,
        /// Search centre
        midpoint: Coordinate,
        /// Venues returned with unusable coordinates
        discarded: usize,
    },

    /// Every candidate's travel-time query failed
    #[error("could not determine best location for trip {trip_id}: none of {evaluated} candidate(s) could be scored")]
    NoViableCandidate {
        /// Trip being resolved
        trip_id: TripId,
        /// Candidates that were evaluated
        evaluated: usize,
    },

    /// A winner was found but could not be written back
    #[error("best location `{}` for trip {trip_id} could not be saved after {attempts} attempt(s): {source}", .resolution.best.name)]
    PersistenceFailed {
        /// Trip being resolved
        trip_id: TripId,
        /// The completed selection, ready for [`crate::Resolver::persist_best`]
        resolution: Box<Resolution>,
        /// Write attempts made
        attempts: u32,
        /// Last store failure
        source: StoreError,
    },

    /// The caller cancelled the run
    #[error("resolution for trip {trip_id} cancelled while {stage}")]
    Cancelled {
        /// Trip being resolved
        trip_id: TripId,
        /// Stage reached
        stage: Stage,
    },

    /// Participants could not be read
    #[error("participant lookup failed for trip {trip_id}: {source}")]
    Store {
        /// Trip being resolved
        trip_id: TripId,
        /// Store failure
        source: StoreError,
    },

    /// The run state machine rejected a transition
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

impl ResolveError {
    /// Error code for programmatic handling
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::TripNotFound { .. } => ErrorCode::TripNotFound,
            Self::NoParticipants { .. } => ErrorCode::NoParticipants,
            Self::RetrievalFailed { source, .. } => match source.kind {
                ProviderErrorKind::Quota => ErrorCode::QuotaExceeded,
                ProviderErrorKind::Denied => ErrorCode::RequestDenied,
                ProviderErrorKind::Timeout => ErrorCode::Timeout,
                _ => ErrorCode::RetrievalFailed,
            },
            Self::NoCandidatesFound { .. } => ErrorCode::NoCandidatesFound,
            Self::NoViableCandidate { .. } => ErrorCode::NoViableCandidate,
            Self::PersistenceFailed { .. } => ErrorCode::PersistenceFailed,
            Self::Cancelled { .. } => ErrorCode::Cancelled,
            Self::Store { .. } => ErrorCode::PersistenceError,
            Self::Transition(_) => ErrorCode::Internal,
        }
    }

    /// Short snake-case kind, used as a metric suffix
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TripNotFound { .. } => "trip_not_found",
            Self::NoParticipants { .. } => "no_participants",
            Self::RetrievalFailed { .. } => "retrieval_failed",
            Self::NoCandidatesFound { .. } => "no_candidates_found",
            Self::NoViableCandidate { .. } => "no_viable_candidate",
            Self::PersistenceFailed { .. } => "persistence_failed",
            Self::Cancelled { .. } => "cancelled",
            Self::Store { .. } => "store",
            Self::Transition(_) => "internal",
        }
    }

    /// Stage the run had reached
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::TripNotFound { .. } | Self::Store { .. } => Stage::LocatingParticipants,
            Self::NoParticipants { .. } => Stage::ComputingMidpoint,
            Self::RetrievalFailed { .. } | Self::NoCandidatesFound { .. } => {
                Stage::FetchingCandidates
            }
            Self::NoViableCandidate { .. } | Self::PersistenceFailed { .. } => Stage::Finalizing,
            Self::Cancelled { stage, .. } => *stage,
            Self::Transition(rejected) => rejected.from.stage(),
        }
    }

    /// Trip the failed run was for, when known
    #[must_use]
    pub fn trip_id(&self) -> Option<&str> {
        match self {
            Self::TripNotFound { trip_id }
            | Self::NoParticipants { trip_id }
            | Self::RetrievalFailed { trip_id, .. }
            | Self::NoCandidatesFound { trip_id, .. }
            | Self::NoViableCandidate { trip_id, .. }
            | Self::PersistenceFailed { trip_id, .. }
            | Self::Cancelled { trip_id, .. }
            | Self::Store { trip_id, .. } => Some(trip_id.as_str()),
            Self::Transition(_) => None,
        }
    }

    /// Reason recorded on the run's `Failed` state
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::TripNotFound { .. } => "trip not found",
            Self::NoParticipants { .. } => "no participants with valid locations",
            Self::RetrievalFailed { .. } => "candidate retrieval failed",
            Self::NoCandidatesFound { .. } => "no candidates found",
            Self::NoViableCandidate { .. } => "could not determine best location",
            Self::PersistenceFailed { .. } => "could not save best location",
            Self::Cancelled { .. } => "cancelled",
            Self::Store { .. } => "participant lookup failed",
            Self::Transition(_) => "internal error",
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NoParticipants { .. } => Some("Ask participants to set a starting location"),
            Self::RetrievalFailed { .. } => Some("Check connectivity and API quota, then try again"),
            Self::NoCandidatesFound { .. } => {
                Some("No venues of this category are near the group's midpoint")
            }
            Self::NoViableCandidate { .. } => {
                Some("Travel times could not be computed for any venue; try again later")
            }
            Self::PersistenceFailed { .. } => Some("The best location was found; retry saving it"),
            _ => None,
        }
    }

    /// Single serializable report carrying trip, stage and provider detail
    #[must_use]
    pub fn to_report(&self) -> ErrorReport {
        let mut error = CoreError::new(self.code(), self.to_string()).with_context(format!(
            "trip: {}, stage: {}",
            self.trip_id().unwrap_or("-"),
            self.stage()
        ));
        if let Some(suggestion) = self.suggestion() {
            error = error.with_suggestion(suggestion);
        }
        match self {
            Self::RetrievalFailed { source, .. } => error = error.with_source(source.clone()),
            Self::PersistenceFailed { source, .. } | Self::Store { source, .. } => {
                error = error.with_source(source.clone());
            }
            _ => {}
        }
        error.to_report()
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn discarded_note(discarded: &usize) -> String {
    match discarded {
        0 => String::new(),
        n => format!(" ({n} result(s) had unusable coordinates)"),
    }
}

/// Category of a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ProviderErrorKind {
    Transport,
    Timeout,
    Quota,
    Denied,
    InvalidResponse,
    Unavailable,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::Quota => "quota",
            Self::Denied => "denied",
            Self::InvalidResponse => "invalid response",
            Self::Unavailable => "unavailable",
        })
    }
}

/// Failure reported by a places or travel-time provider, parsed at the
/// adapter boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message}")]
pub struct ProviderError {
    /// Category
    pub kind: ProviderErrorKind,
    /// Provider-supplied detail
    pub message: String,
}

impl ProviderError {
    /// Build a provider error
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The call did not finish within its timeout
    pub fn timeout(after: std::time::Duration) -> Self {
        Self::new(
            ProviderErrorKind::Timeout,
            format!("no response within {}ms", after.as_millis()),
        )
    }
}

/// Trip store failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Unknown trip
    #[error("trip {0} not found")]
    TripNotFound(TripId),

    /// Trip already exists
    #[error("trip {0} already exists")]
    TripExists(TripId),

    /// User is not a member of the trip
    #[error("user {user_id} is not a participant of trip {trip_id}")]
    UnknownParticipant {
        /// Trip
        trip_id: TripId,
        /// User
        user_id: UserId,
    },

    /// User already joined the trip
    #[error("user {user_id} already joined trip {trip_id}")]
    DuplicateParticipant {
        /// Trip
        trip_id: TripId,
        /// User
        user_id: UserId,
    },

    /// Location outside the valid coordinate range
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    /// The write did not finish within its timeout
    #[error("store operation timed out")]
    Timeout,

    /// Backend-specific failure
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether repeating the same operation may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Backend(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::RunStatus;

    #[test]
    fn test_codes() {
        let err = ResolveError::NoParticipants {
            trip_id: "trip-1".into(),
        };
        assert_eq!(err.code(), ErrorCode::NoParticipants);
        assert_eq!(err.stage(), Stage::ComputingMidpoint);
        assert_eq!(err.kind(), "no_participants");
    }

    #[test]
    fn test_report_carries_trip_stage_and_provider_error() {
        let err = ResolveError::RetrievalFailed {
            trip_id: "trip-7".into(),
            source: ProviderError::new(ProviderErrorKind::Quota, "OVER_QUERY_LIMIT"),
        };
        let report = err.to_report();

        assert_eq!(report.code, ErrorCode::QuotaExceeded);
        assert_eq!(report.code_str, "E5003");
        assert_eq!(report.category, "Provider");
        assert!(report.message.contains("trip-7"));
        assert_eq!(
            report.context.as_deref(),
            Some("trip: trip-7, stage: fetching candidates")
        );
        assert_eq!(report.source.as_deref(), Some("quota error: OVER_QUERY_LIMIT"));
        assert!(report.user_message().contains("try again"));
    }

    #[test]
    fn test_retrieval_code_follows_provider_kind() {
        let failed = |kind| ResolveError::RetrievalFailed {
            trip_id: "trip-1".into(),
            source: ProviderError::new(kind, "detail"),
        };
        assert_eq!(failed(ProviderErrorKind::Denied).code(), ErrorCode::RequestDenied);
        assert_eq!(failed(ProviderErrorKind::Timeout).code(), ErrorCode::Timeout);
        assert_eq!(failed(ProviderErrorKind::Transport).code(), ErrorCode::RetrievalFailed);
        assert_eq!(failed(ProviderErrorKind::Denied).stage(), Stage::FetchingCandidates);
    }

    #[test]
    fn test_no_candidates_mentions_discarded_venues() {
        let none = ResolveError::NoCandidatesFound {
            trip_id: "trip-1".into(),
            midpoint: Coordinate::new(0.5, 0.5),
            discarded: 0,
        };
        assert_eq!(none.to_string(), "no candidates found near 0.5,0.5 for trip trip-1");

        let dropped = ResolveError::NoCandidatesFound {
            trip_id: "trip-1".into(),
            midpoint: Coordinate::new(0.5, 0.5),
            discarded: 2,
        };
        assert_eq!(
            dropped.to_string(),
            "no candidates found near 0.5,0.5 for trip trip-1 (2 result(s) had unusable coordinates)"
        );
    }

    #[test]
    fn test_rejected_transition_reports_its_stage() {
        let err = ResolveError::from(InvalidTransition {
            from: RunStatus::FetchingCandidates,
            to: RunStatus::Finalizing,
        });
        assert_eq!(err.stage(), Stage::FetchingCandidates);
        assert_eq!(err.code(), ErrorCode::Internal);

        let err = ResolveError::from(InvalidTransition {
            from: RunStatus::Idle,
            to: RunStatus::Succeeded,
        });
        assert_eq!(err.stage(), Stage::WaitingForTrip);
    }

    #[test]
    fn test_cancelled_keeps_stage() {
        let err = ResolveError::Cancelled {
            trip_id: "trip-1".into(),
            stage: Stage::EvaluatingCandidates,
        };
        assert_eq!(err.stage(), Stage::EvaluatingCandidates);
        assert_eq!(
            err.to_string(),
            "resolution for trip trip-1 cancelled while evaluating candidates"
        );
    }

    #[test]
    fn test_store_error_retryable() {
        assert!(StoreError::Timeout.is_retryable());
        assert!(StoreError::Backend("connection reset".into()).is_retryable());
        assert!(!StoreError::TripNotFound("trip-1".into()).is_retryable());
    }

    #[test]
    fn test_provider_timeout_message() {
        let err = ProviderError::timeout(std::time::Duration::from_millis(1500));
        assert_eq!(err.kind, ProviderErrorKind::Timeout);
        assert_eq!(err.to_string(), "timeout error: no response within 1500ms");
    }
}
