//! Place Photos
//!
//! Photo references are turned into URLs by formatting alone; the image is
//! fetched later by whoever displays it.

use crate::client::MapsClient;

const PLACE_PHOTO: &str = "place/photo";

/// Photo URL formatting
#[derive(Clone)]
pub struct PhotosApi {
    client: MapsClient,
}

impl PhotosApi {
    pub(crate) fn new(client: MapsClient) -> Self {
        Self { client }
    }

    /// URL of the photo behind `photo_reference`, scaled to `max_width` pixels
    #[must_use]
    pub fn url(&self, photo_reference: &str, max_width: u32) -> String {
        self.client.endpoint_url(
            PLACE_PHOTO,
            &[
                ("maxwidth", max_width.to_string()),
                ("photo_reference", photo_reference.to_string()),
            ],
        )
    }
}
