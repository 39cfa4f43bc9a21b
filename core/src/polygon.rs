//! Ordering of boundary points into a polygon ring.

use isochrone_types::Coordinate;

use crate::geo::bearing;

/// Orders `points` by ascending bearing from `origin`.
///
/// The sort is stable, so points sharing a bearing keep their input order.
/// For a point set with one point per direction the result is a simple
/// (non-self-intersecting) ring around the origin.
#[must_use]
pub fn sort_by_bearing(origin: Coordinate, points: Vec<Coordinate>) -> Vec<Coordinate> {
    let mut keyed: Vec<(f64, Coordinate)> = points
        .into_iter()
        .map(|point| (bearing(origin, point), point))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, point)| point).collect()
}
