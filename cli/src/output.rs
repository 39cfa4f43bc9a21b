//! Rendering a computed isochrone for stdout.

use clap::ValueEnum;
use isochrone_core::Isochrone;
use isochrone_types::Coordinate;
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `{origin, duration_minutes, rounds, points}` with `[lat, lng]` pairs
    #[default]
    Json,
    /// A GeoJSON Feature with a closed Polygon ring in `[lng, lat]` order
    Geojson,
}

#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub origin: Coordinate,
    pub duration_minutes: f64,
    pub rounds: u32,
    pub points: &'a [Coordinate],
}

#[derive(Serialize)]
struct PlainReport {
    origin: [f64; 2],
    duration_minutes: f64,
    rounds: u32,
    points: Vec<[f64; 2]>,
}

impl<'a> Report<'a> {
    #[must_use]
    pub fn new(isochrone: &'a Isochrone, duration_minutes: f64) -> Self {
        Self {
            origin: isochrone.origin(),
            duration_minutes,
            rounds: isochrone.rounds(),
            points: isochrone.points(),
        }
    }

    pub fn render(&self, format: OutputFormat) -> serde_json::Result<String> {
        let value = match format {
            OutputFormat::Json => serde_json::to_value(self.plain())?,
            OutputFormat::Geojson => self.geojson(),
        };
        serde_json::to_string_pretty(&value)
    }

    fn plain(&self) -> PlainReport {
        PlainReport {
            origin: lat_lng(self.origin),
            duration_minutes: self.duration_minutes,
            rounds: self.rounds,
            points: self.points.iter().copied().map(lat_lng).collect(),
        }
    }

    fn geojson(&self) -> Value {
        let mut ring: Vec<[f64; 2]> = self.points.iter().map(Coordinate::to_lng_lat).collect();
        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }
        json!({
            "type": "Feature",
            "properties": {
                "origin": self.origin.to_lng_lat(),
                "duration_minutes": self.duration_minutes,
                "rounds": self.rounds,
            },
            "geometry": {
                "type": "Polygon",
                "coordinates": [ring],
            },
        })
    }
}

fn lat_lng(point: Coordinate) -> [f64; 2] {
    [point.lat(), point.lng()]
}
