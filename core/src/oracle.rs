//! Interfaces to the external services the search depends on.
//!
//! Both oracles are slow and fallible. The search calls them strictly one at a
//! time, so implementations need no internal synchronization beyond what their
//! transport requires.

use std::future::Future;

use isochrone_types::{Coordinate, Location, TravelOptions};
use thiserror::Error;

/// One origin-to-destination element of a travel-time batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Leg {
    /// The service routed to this destination.
    ///
    /// `key` identifies the point the service actually resolved the destination
    /// to (an address or stop). Two nearby candidates that snap to the same
    /// place share a key.
    Resolved { minutes: f64, key: String },
    /// The service reported a per-destination status other than OK.
    Failed { status: String },
}

impl Leg {
    #[must_use]
    pub fn resolved(minutes: f64, key: impl Into<String>) -> Self {
        Leg::Resolved {
            minutes,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn failed(status: impl Into<String>) -> Self {
        Leg::Failed {
            status: status.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    /// Top-level status other than OK, e.g. `OVER_QUERY_LIMIT` or `REQUEST_DENIED`.
    #[error("{service} returned status {status}")]
    Status {
        service: &'static str,
        status: String,
        message: Option<String>,
    },
    #[error("destination {index} returned status {status}")]
    LegStatus { index: usize, status: String },
    #[error("expected {expected} results, got {actual}")]
    LegCount { expected: usize, actual: usize },
    #[error("request rejected before sending: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Travel-time (distance matrix) service.
pub trait TravelTimeOracle {
    /// Returns one [`Leg`] per destination, in destination order.
    ///
    /// A non-OK top-level status fails the whole batch.
    fn travel_times(
        &self,
        origin: Coordinate,
        destinations: &[Location],
        options: &TravelOptions,
    ) -> impl Future<Output = Result<Vec<Leg>, OracleError>> + Send;
}

/// Address-to-coordinate service.
pub trait GeocodeOracle {
    fn geocode(&self, address: &str) -> impl Future<Output = Result<Coordinate, OracleError>> + Send;
}
