//! Google Maps backends for the provider traits
//!
//! Responses are parsed into the resolver's own types here, so nothing
//! Google-shaped crosses into the core.

use crate::error::{ProviderError, ProviderErrorKind};
use crate::model::{CandidateLocation, LegStatus};
use crate::providers::{PhotoResolver, PlacesProvider, TravelTimeProvider, TripStore};
use crate::resolver::Resolver;
use async_trait::async_trait;
use rendezvous_api_client::endpoints::{
    DistanceMatrixParams, DistanceMatrixResponse, NearbySearchParams, PlaceResult,
    MAX_MATRIX_ORIGINS,
};
use rendezvous_api_client::{ApiError, ApiResult, ClientConfig, MapsClient};
use rendezvous_core::config::ConfigSchema;
use rendezvous_geo::Coordinate;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tracing::{instrument, warn};

impl From<ApiError> for ProviderError {
    fn from(err: ApiError) -> Self {
        let kind = if err.is_quota() {
            ProviderErrorKind::Quota
        } else if err.is_denied() {
            ProviderErrorKind::Denied
        } else {
            match err {
                ApiError::Timeout(_) => ProviderErrorKind::Timeout,
                ApiError::Json(_) | ApiError::Provider { .. } => ProviderErrorKind::InvalidResponse,
                ApiError::CircuitOpen => ProviderErrorKind::Unavailable,
                _ => ProviderErrorKind::Transport,
            }
        };
        Self::new(kind, err.to_string())
    }
}

/// Nearby Search backed [`PlacesProvider`]
#[derive(Clone)]
pub struct GooglePlacesProvider {
    client: MapsClient,
}

impl GooglePlacesProvider {
    /// Provider using `client`
    #[must_use]
    pub fn new(client: MapsClient) -> Self {
        Self { client }
    }
}

fn candidate_from_place(place: PlaceResult) -> CandidateLocation {
    CandidateLocation {
        address: place.address().to_string(),
        latitude: place.geometry.location.lat,
        longitude: place.geometry.location.lng,
        photos: place.photos.into_iter().map(|p| p.photo_reference).collect(),
        name: place.name,
        external_id: place.place_id,
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesProvider {
    #[instrument(skip(self), fields(centre = %centre))]
    async fn search_nearby(
        &self,
        centre: Coordinate,
        radius_meters: u32,
        category: &str,
    ) -> Result<Vec<CandidateLocation>, ProviderError> {
        let params =
            NearbySearchParams::new(centre.latitude, centre.longitude, radius_meters, category);
        let response = self.client.places().nearby(&params).await?;
        Ok(response
            .results
            .into_iter()
            .map(candidate_from_place)
            .collect())
    }
}

/// Distance Matrix backed [`TravelTimeProvider`]
#[derive(Clone)]
pub struct GoogleTravelTimeProvider {
    client: MapsClient,
}

impl GoogleTravelTimeProvider {
    /// Provider using `client`
    #[must_use]
    pub fn new(client: MapsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TravelTimeProvider for GoogleTravelTimeProvider {
    #[instrument(skip(self, origins), fields(origins = origins.len(), destination = %destination))]
    async fn matrix(
        &self,
        origins: &[Coordinate],
        destination: Coordinate,
        mode: &str,
    ) -> Result<Vec<LegStatus>, ProviderError> {
        matrix_in_chunks(origins, |points| {
            let params = DistanceMatrixParams::to_single_destination(
                points,
                (destination.latitude, destination.longitude),
                mode,
            );
            async move {
                self.client
                    .distance_matrix()
                    .query(&params)
                    .await
                    .map_err(ProviderError::from)
            }
        })
        .await
    }
}

/// Query `origins` in groups of at most [`MAX_MATRIX_ORIGINS`] and stitch the
/// rows back in input order.
///
/// A failed group marks only its own legs `Failed`. The error is returned
/// only when no group was answered.
async fn matrix_in_chunks<F, Fut>(
    origins: &[Coordinate],
    query: F,
) -> Result<Vec<LegStatus>, ProviderError>
where
    F: Fn(Vec<(f64, f64)>) -> Fut,
    Fut: Future<Output = Result<DistanceMatrixResponse, ProviderError>>,
{
    let chunks: Vec<&[Coordinate]> = origins.chunks(MAX_MATRIX_ORIGINS).collect();
    let answers = join_all(
        chunks
            .iter()
            .map(|chunk| query(chunk.iter().map(|o| (o.latitude, o.longitude)).collect())),
    )
    .await;

    let mut legs = Vec::with_capacity(origins.len());
    let mut answered = false;
    let mut first_error = None;
    for (chunk, answer) in chunks.iter().zip(answers) {
        match answer {
            Ok(response) => {
                answered = true;
                legs.extend((0..chunk.len()).map(|row| leg_from_row(&response, row)));
            }
            Err(err) => {
                warn!(origins = chunk.len(), error = %err, "Distance Matrix request failed");
                legs.extend(std::iter::repeat_n(LegStatus::Failed, chunk.len()));
                first_error.get_or_insert(err);
            }
        }
    }

    match first_error {
        Some(err) if !answered => Err(err),
        _ => Ok(legs),
    }
}

fn leg_from_row(response: &DistanceMatrixResponse, row: usize) -> LegStatus {
    response
        .element(row, 0)
        .and_then(|element| element.duration_seconds())
        .map_or(LegStatus::Failed, |duration_secs| LegStatus::Ok { duration_secs })
}

/// Place Photo URL formatting
#[derive(Clone)]
pub struct GooglePhotoResolver {
    client: MapsClient,
}

impl GooglePhotoResolver {
    /// Resolver using `client`'s base URL and key
    #[must_use]
    pub fn new(client: MapsClient) -> Self {
        Self { client }
    }
}

impl PhotoResolver for GooglePhotoResolver {
    fn resolve_photo_url(&self, _external_id: &str, photo_ref: &str, max_width: u32) -> String {
        self.client.photos().url(photo_ref, max_width)
    }
}

/// Resolver wired to Google Maps, configured from `schema`
pub fn google_resolver(store: Arc<dyn TripStore>, schema: &ConfigSchema) -> ApiResult<Resolver> {
    let client = MapsClient::with_config(ClientConfig::from_google_config(&schema.google)?)?;

    Ok(Resolver::new(
        store,
        Arc::new(GooglePlacesProvider::new(client.clone())),
        Arc::new(GoogleTravelTimeProvider::new(client.clone())),
    )
    .with_photo_resolver(Arc::new(GooglePhotoResolver::new(client)))
    .with_config(schema.resolver.clone()))
}
