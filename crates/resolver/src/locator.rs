//! Participant Locator

use crate::error::StoreError;
use crate::model::{Participant, UserId};
use crate::providers::TripStore;
use rendezvous_geo::Coordinate;
use tracing::{debug, warn};

/// A participant with a usable starting point
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedParticipant {
    /// Member identifier
    pub user_id: UserId,
    /// Starting point
    pub origin: Coordinate,
}

/// Participants of `trip_id` that have set a starting location, in join order.
///
/// Fails with [`StoreError::TripNotFound`] for an unknown trip. The result may
/// be empty.
pub async fn locate_participants(
    store: &dyn TripStore,
    trip_id: &str,
) -> Result<Vec<LocatedParticipant>, StoreError> {
    let participants = store.get_participants(trip_id).await?;
    let total = participants.len();
    let located = with_locations(participants);

    debug!(trip_id, total, located = located.len(), "Located participants");
    Ok(located)
}

/// Drop participants without both coordinates, or with coordinates outside
/// the valid range.
pub fn with_locations(participants: Vec<Participant>) -> Vec<LocatedParticipant> {
    participants
        .into_iter()
        .filter_map(|p| {
            let origin = p.coordinate()?;
            if !origin.is_valid() {
                warn!(user_id = %p.user_id, %origin, "Ignoring out-of-range starting location");
                return None;
            }
            Some(LocatedParticipant {
                user_id: p.user_id,
                origin,
            })
        })
        .collect()
}
