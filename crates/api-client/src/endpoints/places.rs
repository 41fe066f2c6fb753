//! Places Nearby Search
//!
//! `GET place/nearbysearch/json?location=LAT,LNG&radius=R&type=T`

use crate::client::{MapsClient, ServiceStatus};
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};

const NEARBY_SEARCH: &str = "place/nearbysearch/json";

/// Places API interface
#[derive(Clone)]
pub struct PlacesApi {
    client: MapsClient,
}

impl PlacesApi {
    pub(crate) fn new(client: MapsClient) -> Self {
        Self { client }
    }

    /// Venues of `params.place_type` within `params.radius_meters` of the location.
    ///
    /// `ZERO_RESULTS` is a successful, empty response.
    pub async fn nearby(&self, params: &NearbySearchParams) -> ApiResult<NearbySearchResponse> {
        self.client.get(NEARBY_SEARCH, &params.to_query()).await
    }
}

/// Nearby Search request
#[derive(Debug, Clone, PartialEq)]
pub struct NearbySearchParams {
    /// Centre latitude
    pub latitude: f64,
    /// Centre longitude
    pub longitude: f64,
    /// Search radius in meters
    pub radius_meters: u32,
    /// Place type filter, e.g. `restaurant`
    pub place_type: String,
}

impl NearbySearchParams {
    /// Build a request
    pub fn new(latitude: f64, longitude: f64, radius_meters: u32, place_type: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            radius_meters,
            place_type: place_type.into(),
        }
    }

    fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("location", format!("{},{}", self.latitude, self.longitude)),
            ("radius", self.radius_meters.to_string()),
            ("type", self.place_type.clone()),
        ]
    }
}

/// Nearby Search response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbySearchResponse {
    /// Service status
    pub status: String,
    /// Venues in provider order
    #[serde(default)]
    pub results: Vec<PlaceResult>,
    /// Error explanation for non-OK statuses
    #[serde(default)]
    pub error_message: Option<String>,
    /// Token for the next result page
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl ServiceStatus for NearbySearchResponse {
    fn status(&self) -> &str {
        &self.status
    }

    fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    fn accepts(&self, status: &str) -> bool {
        matches!(status, "OK" | "ZERO_RESULTS")
    }
}

/// One venue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceResult {
    /// Stable place identifier
    pub place_id: String,
    /// Display name
    pub name: String,
    /// Short address returned by nearby search
    #[serde(default)]
    pub vicinity: Option<String>,
    /// Full address, present on some responses
    #[serde(default)]
    pub formatted_address: Option<String>,
    /// Location
    pub geometry: Geometry,
    /// Photo references
    #[serde(default)]
    pub photos: Vec<PlacePhoto>,
    /// Place types
    #[serde(default)]
    pub types: Vec<String>,
}

impl PlaceResult {
    /// Best available address text
    #[must_use]
    pub fn address(&self) -> &str {
        self.formatted_address
            .as_deref()
            .or(self.vicinity.as_deref())
            .unwrap_or_default()
    }
}

/// Geometry wrapper
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Geometry {
    /// Venue position
    pub location: LatLng,
}

/// Latitude / longitude pair as the maps services spell it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
}

/// Photo reference attached to a place
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacePhoto {
    /// Opaque reference passed to the photo service
    pub photo_reference: String,
    /// Original height
    #[serde(default)]
    pub height: u32,
    /// Original width
    #[serde(default)]
    pub width: u32,
    /// Required attributions
    #[serde(default)]
    pub html_attributions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::check_status;

    const BODY: &str = r#"{
        "html_attributions": [],
        "results": [
            {
                "geometry": { "location": { "lat": 0.6712, "lng": 0.6645 }, "viewport": {} },
                "name": "Harbour Grill",
                "place_id": "ChIJ-harbour",
                "photos": [
                    { "height": 3024, "width": 4032, "photo_reference": "ref-1", "html_attributions": ["<a>A</a>"] }
                ],
                "types": ["restaurant", "food"],
                "vicinity": "1 Quay Street"
            },
            {
                "geometry": { "location": { "lat": 0.6601, "lng": 0.6702 } },
                "name": "Noodle Bar",
                "place_id": "ChIJ-noodle"
            }
        ],
        "status": "OK"
    }"#;

    #[test]
    fn test_nearby_response_deserialize() {
        let response: NearbySearchResponse = serde_json::from_str(BODY).unwrap();

        assert_eq!(response.results.len(), 2);
        let first = &response.results[0];
        assert_eq!(first.name, "Harbour Grill");
        assert_eq!(first.address(), "1 Quay Street");
        assert_eq!(first.photos[0].photo_reference, "ref-1");
        assert_eq!(first.geometry.location, LatLng { lat: 0.6712, lng: 0.6645 });

        let second = &response.results[1];
        assert!(second.photos.is_empty());
        assert_eq!(second.address(), "");
    }

    #[test]
    fn test_zero_results_is_success() {
        let response: NearbySearchResponse =
            serde_json::from_str(r#"{"results": [], "status": "ZERO_RESULTS"}"#).unwrap();
        assert!(check_status(&response).is_ok());
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_denied_is_error() {
        let response: NearbySearchResponse = serde_json::from_str(
            r#"{"results": [], "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#,
        )
        .unwrap();
        let err = check_status(&response).unwrap_err();
        assert!(err.is_denied());
    }

    #[test]
    fn test_query_parameters() {
        let params = NearbySearchParams::new(0.5, -1.25, 5000, "restaurant");
        assert_eq!(
            params.to_query(),
            vec![
                ("location", "0.5,-1.25".to_string()),
                ("radius", "5000".to_string()),
                ("type", "restaurant".to_string()),
            ]
        );
    }
}
