//! Trip, participant and venue records

use rendezvous_geo::Coordinate;
use serde::{Deserialize, Serialize};

/// Opaque trip identifier
pub type TripId = String;

/// Opaque user identifier, unique within a trip
pub type UserId = String;

/// A trip member and their optional starting point.
///
/// Both coordinates start out null when the user joins and are set together
/// once the user picks a starting location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Member identifier
    pub user_id: UserId,
    /// Starting latitude, if set
    pub latitude: Option<f64>,
    /// Starting longitude, if set
    pub longitude: Option<f64>,
}

impl Participant {
    /// A participant without a starting location
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            latitude: None,
            longitude: None,
        }
    }

    /// A participant with a starting location
    pub fn located(user_id: impl Into<UserId>, latitude: f64, longitude: f64) -> Self {
        Self {
            user_id: user_id.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Starting point, when both coordinates are set
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.latitude?, self.longitude?))
    }
}

/// A venue returned by the places provider.
///
/// Lives for one resolution run; only the winner is ever persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateLocation {
    /// Display name
    pub name: String,
    /// Venue latitude
    pub latitude: f64,
    /// Venue longitude
    pub longitude: f64,
    /// Human-readable address
    pub address: String,
    /// Provider identifier used for photo and detail lookups
    pub external_id: String,
    /// Opaque photo references
    #[serde(default)]
    pub photos: Vec<String>,
}

impl CandidateLocation {
    /// Venue position
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// The persisted winner of a resolution run, photo references already
/// expanded into URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestLocation {
    /// `bestLocationName`
    pub name: String,
    /// `bestLatitude`
    pub latitude: f64,
    /// `bestLongitude`
    pub longitude: f64,
    /// `bestAddress`
    pub address: String,
    /// `bestPlaceId`
    pub place_id: String,
    /// `bestPhotos[]`
    pub photos: Vec<String>,
}

impl BestLocation {
    /// Build the persisted record from a candidate and its resolved photo URLs
    #[must_use]
    pub fn from_candidate(candidate: &CandidateLocation, photo_urls: Vec<String>) -> Self {
        Self {
            name: candidate.name.clone(),
            latitude: candidate.latitude,
            longitude: candidate.longitude,
            address: candidate.address.clone(),
            place_id: candidate.external_id.clone(),
            photos: photo_urls,
        }
    }
}

/// Outcome of one origin to destination travel-time entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegStatus {
    /// Provider computed a duration
    Ok {
        /// Travel time in seconds
        duration_secs: u64,
    },
    /// Provider could not compute this leg
    Failed,
}

impl LegStatus {
    /// Duration when the leg succeeded
    #[must_use]
    pub fn duration_secs(&self) -> Option<u64> {
        match self {
            Self::Ok { duration_secs } => Some(*duration_secs),
            Self::Failed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_coordinate_requires_both() {
        assert!(Participant::new("u1").coordinate().is_none());

        let half = Participant {
            user_id: "u2".into(),
            latitude: Some(1.0),
            longitude: None,
        };
        assert!(half.coordinate().is_none());

        let full = Participant::located("u3", 1.0, 2.0);
        assert_eq!(full.coordinate(), Some(Coordinate::new(1.0, 2.0)));
    }

    #[test]
    fn test_best_location_from_candidate() {
        let candidate = CandidateLocation {
            name: "Harbour Grill".into(),
            latitude: 0.5,
            longitude: 0.6,
            address: "1 Quay Street".into(),
            external_id: "place-1".into(),
            photos: vec!["ref-1".into()],
        };

        let best = BestLocation::from_candidate(&candidate, vec!["https://photo/1".into()]);
        assert_eq!(best.place_id, "place-1");
        assert_eq!(best.photos, vec!["https://photo/1".to_string()]);
        assert_eq!(best.address, "1 Quay Street");
    }

    #[test]
    fn test_leg_status_serde() {
        let ok = serde_json::to_string(&LegStatus::Ok { duration_secs: 42 }).unwrap();
        assert_eq!(ok, r#"{"status":"OK","duration_secs":42}"#);

        let failed: LegStatus = serde_json::from_str(r#"{"status":"FAILED"}"#).unwrap();
        assert_eq!(failed, LegStatus::Failed);
        assert_eq!(failed.duration_secs(), None);
    }
}
