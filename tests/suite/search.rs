//! Radius search against stub oracles

use crate::common::{
    ConstantSpeedOracle, KeyGeocoder, ScriptedOracle, coordinate_key, origin, point,
};
use isochrone_core::geo::{bearing, distance_km};
use isochrone_core::{
    CoreError, IsochroneRequest, Leg, MAX_ROUNDS, OracleError, SearchParams, compute_isochrone,
};
use isochrone_types::{Location, NonEmptyString};

fn request(angles: usize) -> IsochroneRequest {
    IsochroneRequest::new(
        Location::Coordinate(origin()),
        SearchParams::new(15.0, angles, 0.1).unwrap(),
    )
}

#[tokio::test]
async fn constant_speed_converges_to_expected_radius() {
    // 8 km/h for 15 minutes reaches 2 km
    let start = point(40.0, -73.0);
    let travel = ConstantSpeedOracle::new(8.0);
    let geocoder = KeyGeocoder::new(start);
    let request = IsochroneRequest::new(
        Location::Coordinate(start),
        SearchParams::new(15.0, 4, 0.1).unwrap(),
    );

    let isochrone = compute_isochrone(&travel, &geocoder, &request)
        .await
        .unwrap();

    assert_eq!(isochrone.origin(), start);
    assert_eq!(isochrone.points().len(), 4);
    assert!(isochrone.rounds() < MAX_ROUNDS);
    assert_eq!(travel.calls(), isochrone.rounds() as usize);
    assert!(travel.batch_sizes().iter().all(|&n| n == 4));

    // Tolerance of 0.1 min at 8 km/h is about 13 m
    for p in isochrone.points() {
        let d = distance_km(start, *p);
        assert!((d - 2.0).abs() < 0.015, "point {p} at {d} km");
    }

    // North, east, south, west
    let bearings: Vec<f64> = isochrone.points().iter().map(|p| bearing(start, *p)).collect();
    for (got, want) in bearings.iter().zip([0.0, 90.0, 180.0, 270.0]) {
        assert!((got - want).abs() < 0.1, "{bearings:?}");
    }

    // Coordinate origin: only boundary points are geocoded
    assert_eq!(geocoder.calls(), 4);
}

#[tokio::test]
async fn boundary_is_sorted_by_bearing_from_north() {
    let travel = ConstantSpeedOracle::new(20.0);
    let geocoder = KeyGeocoder::new(origin());

    let points = compute_isochrone(&travel, &geocoder, &request(12))
        .await
        .unwrap()
        .into_points();

    assert_eq!(points.len(), 12);
    let bearings: Vec<f64> = points.iter().map(|p| bearing(origin(), *p)).collect();
    assert!(bearings.windows(2).all(|w| w[0] <= w[1]), "{bearings:?}");
    assert!(bearings[0] < 1.0);
    assert!(points[0].lat() > origin().lat());
}

#[tokio::test]
async fn boundary_points_come_from_oracle_keys() {
    let travel = ConstantSpeedOracle::new(8.0);
    let geocoder = KeyGeocoder::new(origin());

    let isochrone = compute_isochrone(&travel, &geocoder, &request(4))
        .await
        .unwrap();

    let addresses = geocoder.addresses();
    for p in isochrone.points() {
        assert!(addresses.contains(&coordinate_key(*p)));
    }
}

#[tokio::test]
async fn address_origin_is_geocoded_once() {
    let travel = ConstantSpeedOracle::new(8.0);
    let geocoder = KeyGeocoder::new(origin());
    let request = IsochroneRequest::new(
        Location::Address(NonEmptyString::new("Plaza de Mayo, Buenos Aires").unwrap()),
        SearchParams::new(15.0, 4, 0.1).unwrap(),
    );

    let isochrone = compute_isochrone(&travel, &geocoder, &request)
        .await
        .unwrap();

    assert_eq!(isochrone.origin(), origin());
    assert_eq!(geocoder.calls(), 1 + 4);
    assert_eq!(geocoder.addresses()[0], "Plaza de Mayo, Buenos Aires");
}

#[tokio::test]
async fn origin_geocode_failure_skips_search() {
    let travel = ConstantSpeedOracle::new(8.0);
    let geocoder = KeyGeocoder::failing();
    let request = IsochroneRequest::new(
        Location::Address(NonEmptyString::new("Nowhere in particular").unwrap()),
        SearchParams::new(15.0, 4, 0.1).unwrap(),
    );

    let err = compute_isochrone(&travel, &geocoder, &request)
        .await
        .unwrap_err();

    assert!(err.is_oracle_failure());
    assert_eq!(travel.calls(), 0);
}

#[tokio::test]
async fn boundary_geocode_failure_fails_computation() {
    let travel = ConstantSpeedOracle::new(8.0);
    let geocoder = KeyGeocoder::failing();

    let err = compute_isochrone(&travel, &geocoder, &request(4))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::OracleFailure(OracleError::Status { ref status, .. }) if status == "ZERO_RESULTS"
    ));
    assert!(travel.calls() > 0);
    assert_eq!(geocoder.calls(), 1);
}

#[test]
fn blank_duration_is_invalid_input() {
    let err = IsochroneRequest::parse("-34.6083,-58.3712", "   ", 12, 0.1).unwrap_err();
    assert!(err.is_invalid_input());

    let err = IsochroneRequest::parse("-34.6083,-58.3712", "15", 0, 0.1).unwrap_err();
    assert!(err.is_invalid_input());
}

#[tokio::test]
async fn over_query_limit_fails_after_one_call() {
    let travel = ScriptedOracle::new(|_, _| {
        Err(OracleError::Status {
            service: "Distance Matrix",
            status: "OVER_QUERY_LIMIT".to_string(),
            message: Some("You have exceeded your daily request quota".to_string()),
        })
    });
    let geocoder = KeyGeocoder::new(origin());

    let err = compute_isochrone(&travel, &geocoder, &request(12))
        .await
        .unwrap_err();

    assert!(err.is_oracle_failure());
    assert_eq!(travel.calls(), 1);
    assert_eq!(geocoder.calls(), 0);
}

#[tokio::test]
async fn failed_leg_aborts_round() {
    let travel = ScriptedOracle::new(|_, destinations| {
        Ok(destinations
            .iter()
            .enumerate()
            .map(|(i, _)| {
                if i == 2 {
                    Leg::failed("ZERO_RESULTS")
                } else {
                    Leg::resolved(15.0, format!("addr-{i}"))
                }
            })
            .collect())
    });
    let geocoder = KeyGeocoder::new(origin());

    let err = compute_isochrone(&travel, &geocoder, &request(4))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        CoreError::OracleFailure(OracleError::LegStatus {
            index: 2,
            status: "ZERO_RESULTS".to_string(),
        })
    );
    assert_eq!(travel.calls(), 1);
}

#[tokio::test]
async fn short_batch_is_rejected() {
    let travel = ScriptedOracle::new(|_, _| Ok(vec![Leg::resolved(15.0, "only")]));
    let geocoder = KeyGeocoder::new(origin());

    let err = compute_isochrone(&travel, &geocoder, &request(4))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        CoreError::OracleFailure(OracleError::LegCount {
            expected: 4,
            actual: 1,
        })
    );
}

#[tokio::test]
async fn repeated_keys_freeze_the_search() {
    // Every candidate along a bearing snaps to the same stop, far short of the target
    let travel = ScriptedOracle::new(|_, destinations| {
        Ok((0..destinations.len())
            .map(|i| Leg::resolved(3.0, format!("stop-{i}")))
            .collect())
    });
    let fallback = point(-34.6, -58.37);
    let geocoder = KeyGeocoder::new(fallback);

    let isochrone = compute_isochrone(&travel, &geocoder, &request(4))
        .await
        .unwrap();

    assert_eq!(isochrone.rounds(), 2);
    assert_eq!(travel.calls(), 2);
    assert_eq!(
        geocoder.addresses(),
        vec!["stop-0", "stop-1", "stop-2", "stop-3"]
    );
    assert!(isochrone.points().iter().all(|p| *p == fallback));
}

#[tokio::test]
async fn never_settling_oracle_times_out() {
    // Always too slow, and never the same key twice
    let travel = ScriptedOracle::new(|call, destinations| {
        Ok((0..destinations.len())
            .map(|i| Leg::resolved(25.0, format!("round-{call}-slot-{i}")))
            .collect())
    });
    let geocoder = KeyGeocoder::new(origin());

    let err = compute_isochrone(&travel, &geocoder, &request(6))
        .await
        .unwrap_err();

    assert_eq!(err, CoreError::ConvergenceTimeout { rounds: MAX_ROUNDS });
    assert_eq!(travel.calls(), MAX_ROUNDS as usize);
    assert_eq!(geocoder.calls(), 0);
}

#[tokio::test]
async fn single_angle_search_points_north() {
    let travel = ConstantSpeedOracle::new(8.0);
    let geocoder = KeyGeocoder::new(origin());

    let isochrone = compute_isochrone(&travel, &geocoder, &request(1))
        .await
        .unwrap();

    let points = isochrone.points();
    assert_eq!(points.len(), 1);
    assert_eq!(bearing(origin(), points[0]), 0.0);
}
