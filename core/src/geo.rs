//! Spherical geometry on a fixed-radius Earth.
//!
//! All functions are pure. NaN and infinite inputs propagate into the result.

use isochrone_types::Coordinate;

/// Mean Earth radius used for every projection, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6378.1;

/// Point reached by travelling `distance_km` from `origin` along the initial
/// bearing `bearing_deg` (degrees clockwise from north).
#[must_use]
pub fn destination_point(origin: Coordinate, bearing_deg: f64, distance_km: f64) -> Coordinate {
    if distance_km == 0.0 {
        return origin;
    }

    let angular = distance_km / EARTH_RADIUS_KM;
    let bearing = bearing_deg.to_radians();
    let lat1 = origin.lat().to_radians();
    let lng1 = origin.lng().to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lng2 = lng1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    Coordinate::wrapped(lat2.to_degrees(), lng2.to_degrees())
}

/// Initial bearing from `from` to `to`, in degrees normalized to [0, 360).
#[must_use]
pub fn bearing(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.lat().to_radians();
    let lat2 = to.lat().to_radians();
    let dlng = (to.lng() - from.lng()).to_radians();

    let y = dlng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();
    let deg = y.atan2(x).to_degrees();

    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    let normalized = deg.rem_euclid(360.0);
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Great-circle distance between two points (haversine), in kilometres.
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let dlat = lat2 - lat1;
    let dlng = (b.lng() - a.lng()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}
