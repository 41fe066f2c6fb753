//! Cost Evaluator / Selector
//!
//! Each candidate gets one travel-time query carrying every participant
//! origin. The legs are folded into an aggregate cost by the configured
//! [`AggregationPolicy`], and the winner is selected by folding scores in
//! provider order with a strict `<`, so ties go to the earliest candidate.

use crate::model::{CandidateLocation, LegStatus};
use crate::providers::TravelTimeProvider;
use rendezvous_core::config::AggregationPolicy;
use rendezvous_geo::{haversine_distance_meters, Coordinate};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Score of one evaluated candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    /// Position in provider order
    pub index: usize,
    /// The venue
    pub candidate: CandidateLocation,
    /// Aggregate travel cost in seconds; `None` when the candidate is not viable
    pub cost: Option<f64>,
    /// Legs with a duration
    pub reachable_legs: usize,
    /// Legs that failed, timed out or were missing from the response
    pub failed_legs: usize,
    /// Great-circle distance from the participants' midpoint
    pub distance_from_midpoint_m: f64,
}

/// Legs folded into one cost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    /// Cost under the policy, `None` if not viable
    pub cost: Option<f64>,
    /// Successful legs
    pub reachable: usize,
    /// Failed legs
    pub failed: usize,
}

/// Fold `legs` for `origins` participants into an aggregate cost.
///
/// Entries are matched to origins by position. Missing entries count as
/// failed legs and surplus entries are ignored. A candidate no participant can
/// reach is never viable, whatever the policy.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(legs: &[LegStatus], origins: usize, policy: AggregationPolicy) -> Aggregate {
    let (total, reachable) = (0..origins)
        .filter_map(|i| legs.get(i).and_then(LegStatus::duration_secs))
        .fold((0u64, 0usize), |(sum, n), secs| (sum.saturating_add(secs), n + 1));
    let failed = origins - reachable;

    let cost = if reachable == 0 {
        None
    } else {
        match policy {
            AggregationPolicy::ZeroFill => Some(total as f64),
            AggregationPolicy::ExcludePartial => (failed == 0).then_some(total as f64),
            AggregationPolicy::AverageReachable => Some(total as f64 / reachable as f64),
        }
    };

    Aggregate {
        cost,
        reachable,
        failed,
    }
}

/// Running minimum of the selection fold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestSoFar {
    /// Position in provider order
    pub index: usize,
    /// The venue
    pub candidate: CandidateLocation,
    /// Its aggregate cost
    pub cost: f64,
}

/// One step of the selection fold. Replaces the running best only when
/// `score` is strictly cheaper.
#[must_use]
pub fn improve(best: Option<BestSoFar>, score: &CandidateScore) -> Option<BestSoFar> {
    let Some(cost) = score.cost else {
        return best;
    };
    match best {
        Some(current) if cost >= current.cost => Some(current),
        _ => Some(BestSoFar {
            index: score.index,
            candidate: score.candidate.clone(),
            cost,
        }),
    }
}

/// Lowest-cost viable candidate, earliest on ties
#[must_use]
pub fn select(scores: &[CandidateScore]) -> Option<BestSoFar> {
    scores.iter().fold(None, improve)
}

/// Scores candidates against a fixed set of origins
pub struct Evaluator<'a> {
    travel: &'a dyn TravelTimeProvider,
    origins: Vec<Coordinate>,
    midpoint: Coordinate,
    mode: &'a str,
    timeout: Duration,
    policy: AggregationPolicy,
}

impl<'a> Evaluator<'a> {
    /// Evaluator for participants starting at `origins`
    pub fn new(
        travel: &'a dyn TravelTimeProvider,
        origins: Vec<Coordinate>,
        midpoint: Coordinate,
        mode: &'a str,
        timeout: Duration,
        policy: AggregationPolicy,
    ) -> Self {
        Self {
            travel,
            origins,
            midpoint,
            mode,
            timeout,
            policy,
        }
    }

    /// Score the candidate at `index`.
    ///
    /// Never fails: a provider error or timeout marks every leg of this
    /// candidate as failed.
    pub async fn evaluate(&self, index: usize, candidate: &CandidateLocation) -> CandidateScore {
        let destination = candidate.coordinate();
        let query = self.travel.matrix(&self.origins, destination, self.mode);

        let legs = match tokio::time::timeout(self.timeout, query).await {
            Ok(Ok(legs)) => {
                if legs.len() != self.origins.len() {
                    warn!(
                        candidate = %candidate.name,
                        expected = self.origins.len(),
                        received = legs.len(),
                        "Travel-time response not aligned with origins"
                    );
                }
                legs
            }
            Ok(Err(error)) => {
                warn!(candidate = %candidate.name, %error, "Travel-time query failed");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    candidate = %candidate.name,
                    timeout_ms = self.timeout.as_millis(),
                    "Travel-time query timed out"
                );
                Vec::new()
            }
        };

        let Aggregate {
            cost,
            reachable,
            failed,
        } = aggregate(&legs, self.origins.len(), self.policy);

        CandidateScore {
            index,
            candidate: candidate.clone(),
            cost,
            reachable_legs: reachable,
            failed_legs: failed,
            distance_from_midpoint_m: haversine_distance_meters(&self.midpoint, &destination),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProviderError, ProviderErrorKind};
    use async_trait::async_trait;
    use proptest::prelude::*;

    fn ok(duration_secs: u64) -> LegStatus {
        LegStatus::Ok { duration_secs }
    }

    fn venue(name: &str) -> CandidateLocation {
        CandidateLocation {
            name: name.into(),
            latitude: 0.5,
            longitude: 0.5,
            address: String::new(),
            external_id: name.to_lowercase(),
            photos: Vec::new(),
        }
    }

    fn score(index: usize, cost: Option<f64>) -> CandidateScore {
        CandidateScore {
            index,
            candidate: venue(&format!("C{}", index + 1)),
            cost,
            reachable_legs: 0,
            failed_legs: 0,
            distance_from_midpoint_m: 0.0,
        }
    }

    #[test]
    fn test_zero_fill_sums_successful_legs() {
        let legs = [ok(400), LegStatus::Failed, ok(500)];
        let agg = aggregate(&legs, 3, AggregationPolicy::ZeroFill);
        assert_eq!(agg.cost, Some(900.0));
        assert_eq!((agg.reachable, agg.failed), (2, 1));
    }

    #[test]
    fn test_exclude_partial() {
        let legs = [ok(400), LegStatus::Failed, ok(500)];
        assert_eq!(aggregate(&legs, 3, AggregationPolicy::ExcludePartial).cost, None);

        let legs = [ok(400), ok(300), ok(500)];
        assert_eq!(
            aggregate(&legs, 3, AggregationPolicy::ExcludePartial).cost,
            Some(1200.0)
        );
    }

    #[test]
    fn test_average_reachable() {
        let legs = [ok(400), LegStatus::Failed, ok(500)];
        assert_eq!(
            aggregate(&legs, 3, AggregationPolicy::AverageReachable).cost,
            Some(450.0)
        );
    }

    #[test]
    fn test_all_failed_is_never_viable() {
        let legs = [LegStatus::Failed, LegStatus::Failed];
        for policy in [
            AggregationPolicy::ZeroFill,
            AggregationPolicy::ExcludePartial,
            AggregationPolicy::AverageReachable,
        ] {
            assert_eq!(aggregate(&legs, 2, policy).cost, None);
        }
        assert_eq!(aggregate(&[], 2, AggregationPolicy::ZeroFill).failed, 2);
    }

    #[test]
    fn test_misaligned_response() {
        // Short: the missing origin is a failed leg.
        let agg = aggregate(&[ok(100)], 2, AggregationPolicy::ZeroFill);
        assert_eq!((agg.cost, agg.failed), (Some(100.0), 1));

        // Long: surplus entries are ignored.
        let agg = aggregate(&[ok(100), ok(200), ok(9999)], 2, AggregationPolicy::ZeroFill);
        assert_eq!((agg.cost, agg.failed), (Some(300.0), 0));
    }

    #[test]
    fn test_tie_goes_to_first() {
        let scores = [score(0, Some(900.0)), score(1, Some(900.0)), score(2, Some(901.0))];
        assert_eq!(select(&scores).map(|b| b.index), Some(0));
    }

    #[test]
    fn test_unviable_candidates_skipped() {
        let scores = [score(0, None), score(1, Some(1200.0)), score(2, None)];
        let best = select(&scores).unwrap();
        assert_eq!(best.index, 1);
        assert_eq!(best.cost, 1200.0);

        assert!(select(&[score(0, None), score(1, None)]).is_none());
        assert!(select(&[]).is_none());
    }

    proptest! {
        #[test]
        fn prop_winner_is_cheapest_and_earliest(
            costs in prop::collection::vec(prop::option::of(0u32..50), 0..20)
        ) {
            let scores: Vec<_> = costs
                .iter()
                .enumerate()
                .map(|(i, c)| score(i, c.map(f64::from)))
                .collect();

            let viable: Vec<(usize, u32)> = costs
                .iter()
                .enumerate()
                .filter_map(|(i, c)| c.map(|c| (i, c)))
                .collect();

            match select(&scores) {
                None => prop_assert!(viable.is_empty()),
                Some(best) => {
                    prop_assert!(viable.iter().all(|&(_, c)| best.cost <= f64::from(c)));
                    let first_min = viable
                        .iter()
                        .filter(|&&(_, c)| f64::from(c) == best.cost)
                        .map(|&(i, _)| i)
                        .min();
                    prop_assert_eq!(Some(best.index), first_min);
                }
            }
        }
    }

    struct Scripted(Result<Vec<LegStatus>, ProviderError>);

    #[async_trait]
    impl TravelTimeProvider for Scripted {
        async fn matrix(
            &self,
            _origins: &[Coordinate],
            _destination: Coordinate,
            _mode: &str,
        ) -> Result<Vec<LegStatus>, ProviderError> {
            self.0.clone()
        }
    }

    struct Stalled;

    #[async_trait]
    impl TravelTimeProvider for Stalled {
        async fn matrix(
            &self,
            _origins: &[Coordinate],
            _destination: Coordinate,
            _mode: &str,
        ) -> Result<Vec<LegStatus>, ProviderError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    fn origins() -> Vec<Coordinate> {
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 2.0),
            Coordinate::new(2.0, 0.0),
        ]
    }

    #[tokio::test]
    async fn test_evaluate_scores_candidate() {
        let travel = Scripted(Ok(vec![ok(300), ok(400), ok(500)]));
        let evaluator = Evaluator::new(
            &travel,
            origins(),
            Coordinate::new(0.5, 0.5),
            "driving",
            Duration::from_secs(5),
            AggregationPolicy::ZeroFill,
        );

        let scored = evaluator.evaluate(3, &venue("C4")).await;
        assert_eq!(scored.index, 3);
        assert_eq!(scored.cost, Some(1200.0));
        assert_eq!(scored.failed_legs, 0);
        assert!(scored.distance_from_midpoint_m < 1.0);
    }

    #[tokio::test]
    async fn test_provider_error_fails_every_leg() {
        let travel = Scripted(Err(ProviderError::new(
            ProviderErrorKind::Transport,
            "connection reset",
        )));
        let evaluator = Evaluator::new(
            &travel,
            origins(),
            Coordinate::new(0.5, 0.5),
            "driving",
            Duration::from_secs(5),
            AggregationPolicy::ZeroFill,
        );

        let scored = evaluator.evaluate(0, &venue("C1")).await;
        assert_eq!(scored.cost, None);
        assert_eq!(scored.failed_legs, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fails_every_leg() {
        let evaluator = Evaluator::new(
            &Stalled,
            origins(),
            Coordinate::new(0.5, 0.5),
            "driving",
            Duration::from_secs(10),
            AggregationPolicy::ZeroFill,
        );

        let scored = evaluator.evaluate(0, &venue("C1")).await;
        assert_eq!(scored.cost, None);
        assert_eq!(scored.failed_legs, 3);
    }
}
