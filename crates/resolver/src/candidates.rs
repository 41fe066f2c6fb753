//! Candidate Finder

use crate::error::ProviderError;
use crate::model::CandidateLocation;
use crate::providers::PlacesProvider;
use rendezvous_geo::Coordinate;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Where and what to search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchArea {
    /// Search centre, normally the participants' midpoint
    pub centre: Coordinate,
    /// Radius in meters
    pub radius_meters: u32,
    /// Place category, e.g. `restaurant`
    pub category: String,
}

/// Venues kept from one search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSearch {
    /// Usable venues in provider order
    pub candidates: Vec<CandidateLocation>,
    /// Venues the provider returned with unusable coordinates
    pub discarded: usize,
}

/// Query the places provider, bounded by `timeout`.
///
/// A timeout is reported as a [`ProviderError`] like any other provider
/// failure. Venues with unusable coordinates are dropped and counted; provider
/// order is otherwise kept as-is.
#[instrument(skip(places, area), fields(centre = %area.centre, radius = area.radius_meters, category = %area.category))]
pub async fn find_candidates(
    places: &dyn PlacesProvider,
    area: &SearchArea,
    timeout: Duration,
) -> Result<CandidateSearch, ProviderError> {
    let found = tokio::time::timeout(
        timeout,
        places.search_nearby(area.centre, area.radius_meters, &area.category),
    )
    .await
    .map_err(|_| ProviderError::timeout(timeout))??;

    let returned = found.len();
    let candidates: Vec<_> = found
        .into_iter()
        .filter(|c| {
            let usable = c.coordinate().is_valid();
            if !usable {
                warn!(name = %c.name, external_id = %c.external_id, "Dropping candidate without usable coordinates");
            }
            usable
        })
        .collect();

    let discarded = returned - candidates.len();
    debug!(returned, kept = candidates.len(), discarded, "Candidates retrieved");
    Ok(CandidateSearch {
        candidates,
        discarded,
    })
}
