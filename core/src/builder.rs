//! Round-based isochrone search.
//!
//! ```text
//! resolve origin -> seed slots -> [round: project -> batch query -> update]* -> resolve -> sort
//!                                   |                                     |
//!                                   +---- Searching ----------------------+---> Converged
//! ```
//!
//! Every round issues exactly one travel-time call covering all slots. The
//! search converges when no slot's radius moved during a round, and gives up
//! with [`CoreError::ConvergenceTimeout`] after [`MAX_ROUNDS`] rounds.

use std::num::NonZeroUsize;

use isochrone_types::{Coordinate, Location, TravelOptions};

use crate::error::CoreError;
use crate::geo::{destination_point, distance_km};
use crate::oracle::{GeocodeOracle, Leg, OracleError, TravelTimeOracle};
use crate::polygon::sort_by_bearing;
use crate::solver::{AngleSlot, Step, Target};

/// Hard cap on travel-time rounds. Key oscillation can in principle keep a
/// slot moving forever.
pub const MAX_ROUNDS: u32 = 30;

pub const DEFAULT_NUMBER_OF_ANGLES: usize = 12;

pub const DEFAULT_TOLERANCE_MINUTES: f64 = 0.1;

/// Validated numeric search inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    duration_minutes: f64,
    number_of_angles: NonZeroUsize,
    tolerance_minutes: f64,
}

impl SearchParams {
    pub fn new(
        duration_minutes: f64,
        number_of_angles: usize,
        tolerance_minutes: f64,
    ) -> Result<Self, CoreError> {
        if !duration_minutes.is_finite() || duration_minutes <= 0.0 {
            return Err(CoreError::invalid(format!(
                "duration must be a positive number of minutes, got {duration_minutes}"
            )));
        }
        let Some(number_of_angles) = NonZeroUsize::new(number_of_angles) else {
            return Err(CoreError::invalid("number of angles must be at least 1"));
        };
        if !tolerance_minutes.is_finite() || tolerance_minutes < 0.0 {
            return Err(CoreError::invalid(format!(
                "tolerance must be a non-negative number of minutes, got {tolerance_minutes}"
            )));
        }
        Ok(Self {
            duration_minutes,
            number_of_angles,
            tolerance_minutes,
        })
    }

    /// Parses a textual duration in minutes. Blank input is rejected.
    pub fn parse_duration(raw: &str) -> Result<f64, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::invalid("duration must not be blank"));
        }
        trimmed
            .parse::<f64>()
            .map_err(|e| CoreError::invalid(format!("duration '{trimmed}' is not a number: {e}")))
    }

    #[must_use]
    pub const fn duration_minutes(&self) -> f64 {
        self.duration_minutes
    }

    #[must_use]
    pub const fn number_of_angles(&self) -> usize {
        self.number_of_angles.get()
    }

    #[must_use]
    pub const fn tolerance_minutes(&self) -> f64 {
        self.tolerance_minutes
    }

    /// Equally spaced bearings starting at north.
    #[must_use]
    pub fn bearings(&self) -> Vec<f64> {
        let n = self.number_of_angles.get();
        let spacing = 360.0 / n as f64;
        (0..n).map(|i| i as f64 * spacing).collect()
    }

    fn target(&self) -> Target {
        Target::new(self.duration_minutes, self.tolerance_minutes)
    }
}

/// Everything needed to compute one isochrone.
#[derive(Debug, Clone, PartialEq)]
pub struct IsochroneRequest {
    pub origin: Location,
    pub params: SearchParams,
    pub options: TravelOptions,
}

impl IsochroneRequest {
    #[must_use]
    pub fn new(origin: Location, params: SearchParams) -> Self {
        Self {
            origin,
            params,
            options: TravelOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: TravelOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates raw user input without touching any oracle.
    pub fn parse(
        origin: &str,
        duration: &str,
        number_of_angles: usize,
        tolerance_minutes: f64,
    ) -> Result<Self, CoreError> {
        let origin =
            Location::parse(origin).map_err(|e| CoreError::invalid(format!("origin: {e}")))?;
        let duration = SearchParams::parse_duration(duration)?;
        let params = SearchParams::new(duration, number_of_angles, tolerance_minutes)?;
        Ok(Self::new(origin, params))
    }
}

/// A converged isochrone boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Isochrone {
    origin: Coordinate,
    points: Vec<Coordinate>,
    rounds: u32,
}

impl Isochrone {
    #[must_use]
    pub const fn origin(&self) -> Coordinate {
        self.origin
    }

    /// Boundary points in ascending bearing order from the origin.
    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Travel-time rounds used before convergence.
    #[must_use]
    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    #[must_use]
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchState {
    Searching { completed: u32 },
    Converged { rounds: u32 },
}

/// Drives the radius search against a pair of oracles.
///
/// The builder holds no per-computation state; slot state lives on the stack
/// of [`IsochroneBuilder::build`], so one builder can serve many requests.
#[derive(Debug)]
pub struct IsochroneBuilder<'a, T, G> {
    travel: &'a T,
    geocoder: &'a G,
}

impl<'a, T, G> IsochroneBuilder<'a, T, G>
where
    T: TravelTimeOracle,
    G: GeocodeOracle,
{
    #[must_use]
    pub const fn new(travel: &'a T, geocoder: &'a G) -> Self {
        Self { travel, geocoder }
    }

    pub async fn build(&self, request: &IsochroneRequest) -> Result<Isochrone, CoreError> {
        let origin = self.resolve_origin(&request.origin).await?;
        let params = request.params;

        let mut slots: Vec<AngleSlot> = params
            .bearings()
            .into_iter()
            .map(|bearing| AngleSlot::seed(bearing, params.duration_minutes()))
            .collect();

        let rounds = self
            .search(origin, &mut slots, params.target(), &request.options)
            .await?;

        let points = self.resolve_boundary(origin, &slots).await?;
        Ok(Isochrone {
            origin,
            points: sort_by_bearing(origin, points),
            rounds,
        })
    }

    async fn resolve_origin(&self, origin: &Location) -> Result<Coordinate, CoreError> {
        match origin {
            Location::Coordinate(point) => Ok(*point),
            Location::Address(address) => {
                let point = self.geocoder.geocode(address.as_str()).await?;
                tracing::info!(%point, "Resolved origin address");
                Ok(point)
            }
        }
    }

    async fn search(
        &self,
        origin: Coordinate,
        slots: &mut [AngleSlot],
        target: Target,
        options: &TravelOptions,
    ) -> Result<u32, CoreError> {
        let mut state = SearchState::Searching { completed: 0 };
        loop {
            state = match state {
                SearchState::Converged { rounds } => {
                    tracing::info!(rounds, slots = slots.len(), "Radius search converged");
                    return Ok(rounds);
                }
                SearchState::Searching { completed } if completed >= MAX_ROUNDS => {
                    tracing::warn!(rounds = completed, "Radius search did not converge");
                    return Err(CoreError::ConvergenceTimeout { rounds: completed });
                }
                SearchState::Searching { completed } => {
                    let round = completed + 1;
                    let movement = self.run_round(origin, slots, target, options).await?;
                    tracing::debug!(round, movement, "Completed search round");
                    if movement == 0.0 {
                        SearchState::Converged { rounds: round }
                    } else {
                        SearchState::Searching { completed: round }
                    }
                }
            };
        }
    }

    /// Queries every slot's candidate in one batch and applies the update rule.
    /// Returns the total radius movement across slots.
    async fn run_round(
        &self,
        origin: Coordinate,
        slots: &mut [AngleSlot],
        target: Target,
        options: &TravelOptions,
    ) -> Result<f64, CoreError> {
        let candidates: Vec<Location> = slots
            .iter()
            .map(|slot| Location::Coordinate(destination_point(origin, slot.bearing(), slot.radius())))
            .collect();

        let legs = self
            .travel
            .travel_times(origin, &candidates, options)
            .await?;
        if legs.len() != slots.len() {
            return Err(OracleError::LegCount {
                expected: slots.len(),
                actual: legs.len(),
            }
            .into());
        }

        let mut movement = 0.0;
        for (index, (slot, leg)) in slots.iter_mut().zip(legs).enumerate() {
            let (minutes, key) = match leg {
                Leg::Resolved { minutes, key } => (minutes, key),
                Leg::Failed { status } => {
                    return Err(OracleError::LegStatus { index, status }.into());
                }
            };
            let step = slot.apply(minutes, &key, target);
            if step != Step::Frozen {
                tracing::trace!(
                    bearing = slot.bearing(),
                    minutes,
                    radius = slot.radius(),
                    ?step,
                    "Slot moved"
                );
            }
            movement += slot.movement();
        }
        Ok(movement)
    }

    /// Re-resolves each slot's final oracle key to the point the routing
    /// service actually snapped to.
    async fn resolve_boundary(
        &self,
        origin: Coordinate,
        slots: &[AngleSlot],
    ) -> Result<Vec<Coordinate>, CoreError> {
        let mut points = Vec::with_capacity(slots.len());
        for slot in slots {
            let key = slot.last_key().ok_or_else(|| {
                OracleError::Malformed(format!("no result recorded for bearing {}", slot.bearing()))
            })?;
            let point = self.geocoder.geocode(key).await?;
            tracing::debug!(
                bearing = slot.bearing(),
                radius_km = slot.radius(),
                snapped_km = distance_km(origin, point),
                "Resolved boundary point"
            );
            points.push(point);
        }
        Ok(points)
    }
}

/// Convenience wrapper around [`IsochroneBuilder`] for a single request.
pub async fn compute_isochrone<T, G>(
    travel: &T,
    geocoder: &G,
    request: &IsochroneRequest,
) -> Result<Isochrone, CoreError>
where
    T: TravelTimeOracle,
    G: GeocodeOracle,
{
    IsochroneBuilder::new(travel, geocoder).build(request).await
}
