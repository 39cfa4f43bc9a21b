//! Geographic coordinates and search locations.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::NonEmptyString;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} out of range [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} out of range [-180, 180]")]
    Longitude(f64),
}

/// A point on the WGS84 sphere, in degrees.
///
/// Values built through [`Coordinate::new`] are finite and in range. Points
/// computed by spherical projection use [`Coordinate::wrapped`], which keeps
/// the latitude as computed and folds the longitude back into [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::Latitude(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Builds a coordinate from computed values without range checks.
    ///
    /// NaN and infinities are carried through unchanged.
    #[must_use]
    pub fn wrapped(lat: f64, lng: f64) -> Self {
        let lng = if (-180.0..=180.0).contains(&lng) {
            lng
        } else if lng.is_finite() {
            (lng + 180.0).rem_euclid(360.0) - 180.0
        } else {
            lng
        };
        Self { lat, lng }
    }

    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// `[lng, lat]` ordering used by GeoJSON.
    #[must_use]
    pub const fn to_lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

/// Formats as `lat,lng`, the form accepted by the routing service query strings.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationParseError {
    #[error("location must not be blank")]
    Blank,
    #[error("invalid coordinate '{raw}': {source}")]
    Coordinate {
        raw: String,
        #[source]
        source: CoordinateError,
    },
}

/// Where a search starts: either free text to be geocoded or a literal point.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Address(NonEmptyString),
    Coordinate(Coordinate),
}

impl Location {
    /// Parses user input.
    ///
    /// Two comma-separated numbers are taken as `lat,lng` and must be in range;
    /// anything else non-blank is an address.
    pub fn parse(raw: &str) -> Result<Self, LocationParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LocationParseError::Blank);
        }

        if let Some((lat, lng)) = trimmed.split_once(',')
            && let Ok(lat) = lat.trim().parse::<f64>()
            && let Ok(lng) = lng.trim().parse::<f64>()
            && lat.is_finite()
            && lng.is_finite()
        {
            return Coordinate::new(lat, lng)
                .map(Location::Coordinate)
                .map_err(|source| LocationParseError::Coordinate {
                    raw: trimmed.to_string(),
                    source,
                });
        }

        NonEmptyString::new(trimmed)
            .map(Location::Address)
            .map_err(|_| LocationParseError::Blank)
    }

    #[must_use]
    pub fn as_coordinate(&self) -> Option<Coordinate> {
        match self {
            Location::Coordinate(point) => Some(*point),
            Location::Address(_) => None,
        }
    }
}

impl From<Coordinate> for Location {
    fn from(point: Coordinate) -> Self {
        Location::Coordinate(point)
    }
}

impl FromStr for Location {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Formats the way the routing service expects a single origin or destination.
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Address(address) => f.write_str(address.as_str()),
            Location::Coordinate(point) => point.fmt(f),
        }
    }
}
