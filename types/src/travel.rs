//! Travel-time query options.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const TRAVEL_MODE_PARSE_VALUES: &[&str] = &["driving", "walking", "bicycling", "transit"];
const AVOID_PARSE_VALUES: &[&str] = &["tolls", "highways", "ferries", "indoor"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumKind {
    TravelMode,
    Avoid,
}

impl EnumKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            EnumKind::TravelMode => "travel mode",
            EnumKind::Avoid => "avoid",
        }
    }
}

impl fmt::Display for EnumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} value '{raw}'; expected one of: {expected:?}")]
pub struct EnumParseError {
    kind: EnumKind,
    raw: String,
    expected: &'static [&'static str],
}

impl EnumParseError {
    #[must_use]
    pub fn new(kind: EnumKind, raw: impl Into<String>, expected: &'static [&'static str]) -> Self {
        Self {
            kind,
            raw: raw.into(),
            expected,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EnumKind {
        self.kind
    }
}

/// How the traveller moves. Transit is the default since public-transport
/// isochrones are the main use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Walking,
    Bicycling,
    #[default]
    Transit,
}

impl TravelMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }

    pub fn parse(s: &str) -> Result<Self, EnumParseError> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "driving" | "drive" | "car" => Ok(TravelMode::Driving),
            "walking" | "walk" => Ok(TravelMode::Walking),
            "bicycling" | "bike" | "cycling" => Ok(TravelMode::Bicycling),
            "transit" => Ok(TravelMode::Transit),
            _ => Err(EnumParseError::new(
                EnumKind::TravelMode,
                trimmed,
                TRAVEL_MODE_PARSE_VALUES,
            )),
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route features the routing service should avoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Avoid {
    Tolls,
    Highways,
    Ferries,
    Indoor,
}

impl Avoid {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Avoid::Tolls => "tolls",
            Avoid::Highways => "highways",
            Avoid::Ferries => "ferries",
            Avoid::Indoor => "indoor",
        }
    }

    pub fn parse(s: &str) -> Result<Self, EnumParseError> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "tolls" => Ok(Avoid::Tolls),
            "highways" => Ok(Avoid::Highways),
            "ferries" => Ok(Avoid::Ferries),
            "indoor" => Ok(Avoid::Indoor),
            _ => Err(EnumParseError::new(
                EnumKind::Avoid,
                trimmed,
                AVOID_PARSE_VALUES,
            )),
        }
    }

    /// Parses a comma- or pipe-separated list, skipping empty entries.
    pub fn parse_list(s: &str) -> Result<Vec<Self>, EnumParseError> {
        let mut out = Vec::new();
        for part in s.split([',', '|']).map(str::trim).filter(|p| !p.is_empty()) {
            let avoid = Self::parse(part)?;
            if !out.contains(&avoid) {
                out.push(avoid);
            }
        }
        Ok(out)
    }
}

/// Options forwarded with every travel-time batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelOptions {
    pub mode: TravelMode,
    pub avoid: Vec<Avoid>,
    /// Ask for live-traffic durations departing now.
    pub departure_now: bool,
}

impl Default for TravelOptions {
    fn default() -> Self {
        Self {
            mode: TravelMode::default(),
            avoid: vec![Avoid::Tolls, Avoid::Ferries],
            departure_now: false,
        }
    }
}

impl TravelOptions {
    /// Pipe-joined avoid list, or `None` when nothing is avoided.
    #[must_use]
    pub fn avoid_param(&self) -> Option<String> {
        if self.avoid.is_empty() {
            return None;
        }
        Some(
            self.avoid
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join("|"),
        )
    }
}
