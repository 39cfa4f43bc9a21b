//! Isochrone search core.
//!
//! # Architecture
//!
//! - [`geo`] - Spherical projection and bearings
//! - [`solver`] - Per-bearing bisection state ([`AngleSlot`])
//! - [`builder`] - Round orchestration ([`IsochroneBuilder`])
//! - [`polygon`] - Angular ordering of the final points
//! - [`oracle`] - Traits for the travel-time and geocoding services
//!
//! The core performs no IO of its own. All network access goes through the
//! [`TravelTimeOracle`] and [`GeocodeOracle`] implementations supplied by the
//! caller, one call at a time.
//!
//! # Error Handling
//!
//! Every failure is a [`CoreError`]. There are no internal retries and no
//! partial results: a computation either yields a complete, sorted boundary
//! or an error.

pub mod builder;
mod error;
pub mod geo;
pub mod oracle;
pub mod polygon;
pub mod solver;

pub use builder::{
    DEFAULT_NUMBER_OF_ANGLES, DEFAULT_TOLERANCE_MINUTES, Isochrone, IsochroneBuilder,
    IsochroneRequest, MAX_ROUNDS, SearchParams, compute_isochrone,
};
pub use error::CoreError;
pub use oracle::{GeocodeOracle, Leg, OracleError, TravelTimeOracle};
pub use solver::{AngleSlot, Step, Target};

pub use isochrone_types;
