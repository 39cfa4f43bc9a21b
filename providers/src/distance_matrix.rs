//! Distance Matrix API: one origin, many destinations, one request.

use isochrone_core::{Leg, OracleError, TravelTimeOracle};
use isochrone_types::{Coordinate, Location, TravelOptions};
use serde::Deserialize;

use crate::{GoogleMapsClient, check_status};

const SERVICE: &str = "Distance Matrix";
const ENDPOINT: &str = "maps/api/distancematrix/json";

/// Most destinations the service accepts for a single origin.
pub const MAX_DESTINATIONS_PER_REQUEST: usize = 25;

#[derive(Debug, Deserialize)]
pub struct DistanceMatrixResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub destination_addresses: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
pub struct Element {
    pub status: String,
    #[serde(default)]
    pub duration: Option<TextValue>,
    #[serde(default)]
    pub duration_in_traffic: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
pub struct TextValue {
    /// Seconds for durations, metres for distances.
    pub value: f64,
}

impl DistanceMatrixResponse {
    /// Converts the single-origin response into one [`Leg`] per destination.
    ///
    /// Live-traffic duration wins over the scheduled one when both are present.
    pub fn into_legs(self) -> Result<Vec<Leg>, OracleError> {
        check_status(SERVICE, &self.status, self.error_message)?;

        let Some(row) = self.rows.into_iter().next() else {
            return Err(OracleError::Malformed(format!("{SERVICE}: no rows")));
        };
        if row.elements.len() != self.destination_addresses.len() {
            return Err(OracleError::Malformed(format!(
                "{SERVICE}: {} elements for {} destination addresses",
                row.elements.len(),
                self.destination_addresses.len()
            )));
        }

        row.elements
            .into_iter()
            .zip(self.destination_addresses)
            .enumerate()
            .map(|(index, (element, address))| {
                if element.status != "OK" {
                    return Ok(Leg::failed(element.status));
                }
                let seconds = element
                    .duration_in_traffic
                    .or(element.duration)
                    .map(|d| d.value)
                    .ok_or_else(|| {
                        OracleError::Malformed(format!(
                            "{SERVICE}: element {index} is OK but has no duration"
                        ))
                    })?;
                Ok(Leg::resolved(seconds / 60.0, address))
            })
            .collect()
    }
}

impl TravelTimeOracle for GoogleMapsClient {
    async fn travel_times(
        &self,
        origin: Coordinate,
        destinations: &[Location],
        options: &TravelOptions,
    ) -> Result<Vec<Leg>, OracleError> {
        if destinations.is_empty() {
            return Err(OracleError::Rejected("no destinations".to_string()));
        }
        if destinations.len() > MAX_DESTINATIONS_PER_REQUEST {
            return Err(OracleError::Rejected(format!(
                "{} destinations exceeds the limit of {MAX_DESTINATIONS_PER_REQUEST} per request",
                destinations.len()
            )));
        }

        let mut url = self.endpoint(ENDPOINT)?;
        {
            let destinations = destinations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("|");
            let mut query = url.query_pairs_mut();
            query
                .append_pair("origins", &origin.to_string())
                .append_pair("destinations", &destinations)
                .append_pair("mode", options.mode.as_str())
                .append_pair("units", "metric");
            if let Some(avoid) = options.avoid_param() {
                query.append_pair("avoid", &avoid);
            }
            if options.departure_now {
                query.append_pair("departure_time", "now");
            }
        }

        tracing::debug!(
            destinations = destinations.len(),
            mode = %options.mode,
            "Requesting travel times"
        );
        let response: DistanceMatrixResponse = self.get_json(url, SERVICE).await?;
        response.into_legs()
    }
}
