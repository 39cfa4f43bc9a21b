//! Full search through `GoogleMapsClient` against a mock server that routes
//! at a constant speed

use crate::common::{mock_client, origin, point};
use isochrone_core::geo::{bearing, distance_km};
use isochrone_core::{CoreError, IsochroneRequest, OracleError, compute_isochrone};
use isochrone_types::{Coordinate, Location};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn query(request: &Request, name: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

fn parse_point(raw: &str) -> Option<Coordinate> {
    Location::parse(raw).ok()?.as_coordinate()
}

/// Distance Matrix stand-in: straight-line distance at `speed_kmh`, echoing
/// each destination back as its resolved address.
struct ConstantSpeedMatrix {
    speed_kmh: f64,
}

impl Respond for ConstantSpeedMatrix {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let (Some(origins), Some(destinations)) =
            (query(request, "origins"), query(request, "destinations"))
        else {
            return ResponseTemplate::new(200)
                .set_body_json(json!({"status": "INVALID_REQUEST", "rows": []}));
        };
        let Some(from) = parse_point(&origins) else {
            return ResponseTemplate::new(200)
                .set_body_json(json!({"status": "INVALID_REQUEST", "rows": []}));
        };

        let addresses: Vec<&str> = destinations.split('|').collect();
        let elements: Vec<serde_json::Value> = addresses
            .iter()
            .map(|raw| match parse_point(raw) {
                Some(to) => {
                    let seconds = distance_km(from, to) / self.speed_kmh * 3600.0;
                    json!({"status": "OK", "duration": {"value": seconds, "text": ""}})
                }
                None => json!({"status": "NOT_FOUND"}),
            })
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "origin_addresses": [origins],
            "destination_addresses": addresses,
            "rows": [{"elements": elements}]
        }))
    }
}

/// Geocoding stand-in: `lat,lng` text maps to itself, "Plaza de Mayo" to the
/// test origin, everything else to `ZERO_RESULTS`.
struct EchoGeocoder;

impl Respond for EchoGeocoder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let address = query(request, "address").unwrap_or_default();
        let found = parse_point(&address).or_else(|| {
            address
                .starts_with("Plaza de Mayo")
                .then(origin)
        });
        let body = match found {
            Some(p) => json!({
                "status": "OK",
                "results": [{"geometry": {"location": {"lat": p.lat(), "lng": p.lng()}}}]
            }),
            None => json!({"status": "ZERO_RESULTS", "results": []}),
        };
        ResponseTemplate::new(200).set_body_json(body)
    }
}

async fn start_maps_mock(speed_kmh: f64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/distancematrix/json"))
        .respond_with(ConstantSpeedMatrix { speed_kmh })
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .respond_with(EchoGeocoder)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn address_origin_end_to_end() {
    let server = start_maps_mock(12.0).await;
    let client = mock_client(&server);
    let request = IsochroneRequest::parse("Plaza de Mayo, Buenos Aires", "10", 8, 0.1).unwrap();

    let isochrone = compute_isochrone(&client, &client, &request).await.unwrap();

    // 12 km/h for 10 minutes reaches 2 km; 0.1 min tolerance is 20 m
    assert_eq!(isochrone.origin(), origin());
    assert_eq!(isochrone.points().len(), 8);
    for p in isochrone.points() {
        let d = distance_km(origin(), *p);
        assert!((d - 2.0).abs() < 0.025, "point {p} at {d} km");
    }
    let bearings: Vec<f64> = isochrone
        .points()
        .iter()
        .map(|p| bearing(origin(), *p))
        .collect();
    assert!(bearings.windows(2).all(|w| w[0] <= w[1]), "{bearings:?}");

    let requests = server.received_requests().await.unwrap();
    let matrix_calls = requests
        .iter()
        .filter(|r| r.url.path().ends_with("distancematrix/json"))
        .count();
    let geocode_calls = requests.len() - matrix_calls;
    assert_eq!(matrix_calls, isochrone.rounds() as usize);
    assert_eq!(geocode_calls, 1 + 8);
}

#[tokio::test]
async fn unknown_origin_address_fails() {
    let server = start_maps_mock(12.0).await;
    let client = mock_client(&server);
    let request = IsochroneRequest::parse("Atlantis", "10", 8, 0.1).unwrap();

    let err = compute_isochrone(&client, &client, &request)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::OracleFailure(OracleError::Status { ref status, .. }) if status == "ZERO_RESULTS"
    ));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn coordinate_origin_near_antimeridian() {
    let server = start_maps_mock(30.0).await;
    let client = mock_client(&server);
    let fiji = point(-17.8, 179.99);
    let request = IsochroneRequest::parse("-17.8,179.99", "20", 4, 0.1).unwrap();

    let isochrone = compute_isochrone(&client, &client, &request).await.unwrap();

    assert_eq!(isochrone.points().len(), 4);
    for p in isochrone.points() {
        assert!((-180.0..=180.0).contains(&p.lng()), "{p}");
        let d = distance_km(fiji, *p);
        assert!((d - 10.0).abs() < 0.06, "point {p} at {d} km");
    }
}
