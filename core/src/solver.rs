//! Per-direction radius search.
//!
//! Each [`AngleSlot`] runs an independent bisection on the radius along one
//! bearing. The search brackets the target duration between a lower and an
//! upper radius and halves toward whichever side the oracle reports.
//!
//! # Freeze rule
//!
//! A slot stops moving for a round when either:
//!
//! - the reported travel time is within tolerance of the target, or
//! - the oracle resolved the candidate to the same key as the previous round.
//!
//! The second case happens when the routing service snaps several distinct
//! candidate points to one address or stop. Bisecting further inside such a
//! step cannot change the answer, so the slot holds its radius instead of
//! spinning.

/// Seed radius per minute of target duration (km/min, about 5 km/h).
pub const SEED_KM_PER_MINUTE: f64 = 1.0 / 12.0;

/// Upper search bound per minute of target duration (km/min, 75 km/h).
pub const MAX_KM_PER_MINUTE: f64 = 1.25;

/// Target duration and the band around it that counts as a hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub minutes: f64,
    pub tolerance: f64,
}

impl Target {
    #[must_use]
    pub const fn new(minutes: f64, tolerance: f64) -> Self {
        Self { minutes, tolerance }
    }

    fn is_under(&self, reported: f64) -> bool {
        reported < self.minutes - self.tolerance
    }

    fn is_over(&self, reported: f64) -> bool {
        reported > self.minutes + self.tolerance
    }
}

/// Direction a slot moved in one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Reported time was short; the radius grew toward the upper bound.
    Outward,
    /// Reported time was long; the radius shrank toward the lower bound.
    Inward,
    /// Within tolerance or the oracle key repeated; the radius held.
    Frozen,
}

/// Search state for one bearing.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleSlot {
    bearing: f64,
    radius_prev: f64,
    radius_cur: f64,
    radius_min: f64,
    radius_max: f64,
    last_key: Option<String>,
}

impl AngleSlot {
    /// Fresh slot for `bearing` searching toward `target_minutes`.
    #[must_use]
    pub fn seed(bearing: f64, target_minutes: f64) -> Self {
        Self {
            bearing,
            radius_prev: 0.0,
            radius_cur: target_minutes * SEED_KM_PER_MINUTE,
            radius_min: 0.0,
            radius_max: target_minutes * MAX_KM_PER_MINUTE,
            last_key: None,
        }
    }

    #[must_use]
    pub const fn bearing(&self) -> f64 {
        self.bearing
    }

    /// Radius to query next, in kilometres.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius_cur
    }

    /// Radius that was queried in the most recent round.
    #[must_use]
    pub const fn previous_radius(&self) -> f64 {
        self.radius_prev
    }

    /// Current `(lower, upper)` search bracket.
    #[must_use]
    pub const fn bounds(&self) -> (f64, f64) {
        (self.radius_min, self.radius_max)
    }

    /// Oracle key seen in the most recent round, `None` before the first round.
    #[must_use]
    pub fn last_key(&self) -> Option<&str> {
        self.last_key.as_deref()
    }

    /// How far the radius moved in the most recent round.
    #[must_use]
    pub fn movement(&self) -> f64 {
        (self.radius_cur - self.radius_prev).abs()
    }

    /// Feeds one oracle answer for the candidate at [`Self::radius`] and
    /// advances the search.
    pub fn apply(&mut self, reported_minutes: f64, key: &str, target: Target) -> Step {
        let fresh = self.last_key.as_deref() != Some(key);
        let current = self.radius_cur;

        let (next, step) = if fresh && target.is_under(reported_minutes) {
            self.radius_min = current;
            ((self.radius_max + current) / 2.0, Step::Outward)
        } else if fresh && target.is_over(reported_minutes) {
            self.radius_max = current;
            ((self.radius_min + current) / 2.0, Step::Inward)
        } else {
            (current, Step::Frozen)
        };

        self.last_key = Some(key.to_string());
        self.radius_prev = current;
        self.radius_cur = next;
        step
    }
}
