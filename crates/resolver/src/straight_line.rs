//! Offline travel-time oracle
//!
//! Estimates travel time as great-circle distance over an average speed for
//! the travel mode. No road network, so it underestimates real durations; it
//! is meant for tests, demos and as a degraded fallback when the maps
//! service is unavailable.

use crate::error::ProviderError;
use crate::model::LegStatus;
use crate::providers::TravelTimeProvider;
use async_trait::async_trait;
use rendezvous_geo::{haversine_distance, Coordinate};

/// Average speeds in km/h
const DRIVING_KMH: f64 = 40.0;
const TRANSIT_KMH: f64 = 25.0;
const BICYCLING_KMH: f64 = 15.0;
const WALKING_KMH: f64 = 5.0;

/// [`TravelTimeProvider`] computing durations from straight-line distance
#[derive(Debug, Clone, Copy)]
pub struct StraightLineTravelTime {
    driving_kmh: f64,
}

impl Default for StraightLineTravelTime {
    fn default() -> Self {
        Self {
            driving_kmh: DRIVING_KMH,
        }
    }
}

impl StraightLineTravelTime {
    /// Oracle with the given average driving speed
    #[must_use]
    pub fn with_driving_speed(driving_kmh: f64) -> Self {
        Self { driving_kmh }
    }

    fn speed_kmh(&self, mode: &str) -> f64 {
        match mode {
            "walking" => WALKING_KMH,
            "bicycling" => BICYCLING_KMH,
            "transit" => TRANSIT_KMH,
            _ => self.driving_kmh,
        }
    }

    /// Duration of one leg, `Failed` for unusable inputs
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn leg(&self, origin: &Coordinate, destination: &Coordinate, mode: &str) -> LegStatus {
        let speed = self.speed_kmh(mode);
        if !(speed.is_finite() && speed > 0.0) || !origin.is_valid() || !destination.is_valid() {
            return LegStatus::Failed;
        }
        let hours = haversine_distance(origin, destination) / speed;
        LegStatus::Ok {
            duration_secs: (hours * 3600.0).round() as u64,
        }
    }
}

#[async_trait]
impl TravelTimeProvider for StraightLineTravelTime {
    async fn matrix(
        &self,
        origins: &[Coordinate],
        destination: Coordinate,
        mode: &str,
    ) -> Result<Vec<LegStatus>, ProviderError> {
        Ok(origins
            .iter()
            .map(|origin| self.leg(origin, &destination, mode))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        let here = Coordinate::new(52.52, 13.405);
        assert_eq!(
            StraightLineTravelTime::default().leg(&here, &here, "driving"),
            LegStatus::Ok { duration_secs: 0 }
        );
    }

    #[test]
    fn test_driving_duration() {
        // One degree of longitude at the equator is ~111.2 km; at 40 km/h
        // that is ~2.78 h.
        let oracle = StraightLineTravelTime::default();
        let secs = oracle
            .leg(&Coordinate::new(0.0, 0.0), &Coordinate::new(0.0, 1.0), "driving")
            .duration_secs()
            .unwrap();
        assert!((9900..10100).contains(&secs), "got {secs}");
    }

    #[test]
    fn test_walking_is_slower() {
        let oracle = StraightLineTravelTime::default();
        let from = Coordinate::new(0.0, 0.0);
        let to = Coordinate::new(0.0, 0.1);
        let drive = oracle.leg(&from, &to, "driving").duration_secs().unwrap();
        let walk = oracle.leg(&from, &to, "walking").duration_secs().unwrap();
        assert!(walk > drive * 7);
    }

    #[test]
    fn test_unusable_inputs_fail() {
        let oracle = StraightLineTravelTime::with_driving_speed(0.0);
        let here = Coordinate::new(0.0, 0.0);
        assert_eq!(oracle.leg(&here, &here, "driving"), LegStatus::Failed);

        let oracle = StraightLineTravelTime::default();
        assert_eq!(
            oracle.leg(&Coordinate::new(100.0, 0.0), &here, "driving"),
            LegStatus::Failed
        );
    }

    #[tokio::test]
    async fn test_matrix_is_aligned_with_origins() {
        let origins = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(95.0, 0.0),
            Coordinate::new(0.0, 0.01),
        ];
        let legs = StraightLineTravelTime::default()
            .matrix(&origins, Coordinate::new(0.0, 0.01), "driving")
            .await
            .unwrap();

        assert_eq!(legs.len(), 3);
        assert!(legs[0].duration_secs().unwrap() > 0);
        assert_eq!(legs[1], LegStatus::Failed);
        assert_eq!(legs[2], LegStatus::Ok { duration_secs: 0 });
    }
}
