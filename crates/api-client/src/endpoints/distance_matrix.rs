//! Distance Matrix
//!
//! `GET distancematrix/json?origins=A|B|C&destinations=D&mode=driving`
//!
//! One row per origin, in request order; each row has one element per
//! destination. At most [`MAX_MATRIX_ORIGINS`] origins fit in one request.

use crate::client::{MapsClient, ServiceStatus};
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};

const DISTANCE_MATRIX: &str = "distancematrix/json";

/// Most origins one request may carry; larger requests are refused with
/// `MAX_DIMENSIONS_EXCEEDED`
pub const MAX_MATRIX_ORIGINS: usize = 25;

/// Distance Matrix API interface
#[derive(Clone)]
pub struct DistanceMatrixApi {
    client: MapsClient,
}

impl DistanceMatrixApi {
    pub(crate) fn new(client: MapsClient) -> Self {
        Self { client }
    }

    /// Travel times from every origin to every destination
    pub async fn query(&self, params: &DistanceMatrixParams) -> ApiResult<DistanceMatrixResponse> {
        self.client.get(DISTANCE_MATRIX, &params.to_query()).await
    }
}

/// Distance Matrix request
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrixParams {
    /// `(lat, lng)` origins
    pub origins: Vec<(f64, f64)>,
    /// `(lat, lng)` destinations
    pub destinations: Vec<(f64, f64)>,
    /// `driving`, `walking`, `bicycling` or `transit`
    pub mode: String,
}

impl DistanceMatrixParams {
    /// Many origins to a single destination
    pub fn to_single_destination(
        origins: Vec<(f64, f64)>,
        destination: (f64, f64),
        mode: impl Into<String>,
    ) -> Self {
        Self {
            origins,
            destinations: vec![destination],
            mode: mode.into(),
        }
    }

    fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("origins", join_points(&self.origins)),
            ("destinations", join_points(&self.destinations)),
            ("mode", self.mode.clone()),
        ]
    }
}

fn join_points(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(lat, lng)| format!("{lat},{lng}"))
        .collect::<Vec<_>>()
        .join("|")
}

/// Distance Matrix response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceMatrixResponse {
    /// Top-level service status
    pub status: String,
    /// Geocoded origins
    #[serde(default)]
    pub origin_addresses: Vec<String>,
    /// Geocoded destinations
    #[serde(default)]
    pub destination_addresses: Vec<String>,
    /// One row per origin
    #[serde(default)]
    pub rows: Vec<MatrixRow>,
    /// Error explanation for non-OK statuses
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ServiceStatus for DistanceMatrixResponse {
    fn status(&self) -> &str {
        &self.status
    }

    fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

impl DistanceMatrixResponse {
    /// Element for origin `row` to destination `column`
    #[must_use]
    pub fn element(&self, row: usize, column: usize) -> Option<&MatrixElement> {
        self.rows.get(row)?.elements.get(column)
    }
}

/// One origin row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixRow {
    /// One element per destination
    #[serde(default)]
    pub elements: Vec<MatrixElement>,
}

/// One origin to destination pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixElement {
    /// `OK`, `NOT_FOUND`, `ZERO_RESULTS`, ...
    pub status: String,
    /// Travel time in seconds
    #[serde(default)]
    pub duration: Option<TextValue>,
    /// Distance in meters
    #[serde(default)]
    pub distance: Option<TextValue>,
}

impl MatrixElement {
    /// Duration in seconds when the element succeeded
    #[must_use]
    pub fn duration_seconds(&self) -> Option<u64> {
        if self.status == "OK" {
            self.duration.as_ref().map(|d| d.value)
        } else {
            None
        }
    }
}

/// `{ "text": "14 mins", "value": 840 }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextValue {
    /// Human-readable text
    #[serde(default)]
    pub text: String,
    /// Numeric value (seconds or meters)
    pub value: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "destination_addresses": ["1 Quay Street"],
        "origin_addresses": ["A", "B", "C"],
        "rows": [
            { "elements": [ { "distance": { "text": "5 km", "value": 5012 }, "duration": { "text": "7 mins", "value": 420 }, "status": "OK" } ] },
            { "elements": [ { "status": "ZERO_RESULTS" } ] },
            { "elements": [ { "distance": { "text": "9 km", "value": 9120 }, "duration": { "text": "13 mins", "value": 780 }, "status": "OK" } ] }
        ],
        "status": "OK"
    }"#;

    #[test]
    fn test_matrix_response_deserialize() {
        let response: DistanceMatrixResponse = serde_json::from_str(BODY).unwrap();

        assert_eq!(response.rows.len(), 3);
        assert_eq!(response.element(0, 0).unwrap().duration_seconds(), Some(420));
        assert_eq!(response.element(1, 0).unwrap().duration_seconds(), None);
        assert_eq!(response.element(2, 0).unwrap().duration_seconds(), Some(780));
        assert!(response.element(3, 0).is_none());
    }

    #[test]
    fn test_failed_element_ignores_stale_duration() {
        let element: MatrixElement = serde_json::from_str(
            r#"{ "status": "NOT_FOUND", "duration": { "text": "", "value": 12 } }"#,
        )
        .unwrap();
        assert_eq!(element.duration_seconds(), None);
    }

    #[test]
    fn test_query_joins_origins_with_pipes() {
        let params = DistanceMatrixParams::to_single_destination(
            vec![(0.0, 0.0), (0.0, 2.0), (2.0, 0.0)],
            (0.5, 0.5),
            "driving",
        );
        assert_eq!(
            params.to_query(),
            vec![
                ("origins", "0,0|0,2|2,0".to_string()),
                ("destinations", "0.5,0.5".to_string()),
                ("mode", "driving".to_string()),
            ]
        );
    }
}
