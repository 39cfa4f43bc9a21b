//! Geocoding API: address text to coordinate.

use isochrone_core::{GeocodeOracle, OracleError};
use isochrone_types::Coordinate;
use serde::Deserialize;

use crate::{GoogleMapsClient, check_status};

const SERVICE: &str = "Geocoding";
const ENDPOINT: &str = "maps/api/geocode/json";

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl GeocodeResponse {
    /// First result's location. Google orders results by relevance.
    pub fn into_coordinate(self) -> Result<Coordinate, OracleError> {
        check_status(SERVICE, &self.status, self.error_message)?;

        let Some(first) = self.results.into_iter().next() else {
            return Err(OracleError::Malformed(format!(
                "{SERVICE}: status OK with no results"
            )));
        };
        let LatLng { lat, lng } = first.geometry.location;
        Coordinate::new(lat, lng).map_err(|e| OracleError::Malformed(format!("{SERVICE}: {e}")))
    }
}

impl GeocodeOracle for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<Coordinate, OracleError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(OracleError::Rejected("blank address".to_string()));
        }

        let mut url = self.endpoint(ENDPOINT)?;
        url.query_pairs_mut().append_pair("address", address);

        tracing::debug!(address_len = address.len(), "Geocoding address");
        let response: GeocodeResponse = self.get_json(url, SERVICE).await?;
        response.into_coordinate()
    }
}
