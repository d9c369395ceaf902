//! Simulation engine
//!
//! Random-walk RPM model with an idle floor and a rev limiter. Each tick draws a delta,
//! applies it, then pulls the candidate back into the legal band with a little jitter so
//! the needle never pins at either end.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::curve::torque_at;
use super::{SimulationState, IDLE_FLOOR_RPM};
use crate::profile::{ProfileDefinition, MAX_PROFILE_RPM};

/// Range of the per-tick RPM delta
const DELTA_MIN: i32 = -300;
const DELTA_MAX: i32 = 500;

/// Jitter added above the idle floor
const IDLE_JITTER: i32 = 200;

/// Jitter subtracted below the rev limiter
const LIMITER_JITTER: i32 = 500;

/// Engine simulator generating RPM and torque for the active profile.
///
/// Generic over the random source so ticks are reproducible with a seeded generator.
pub struct SimulationEngine<R = StdRng> {
    /// Current simulated values
    state: SimulationState,
    /// Random number generator
    rng: R,
    /// Number of ticks since creation
    ticks: u64,
}

impl Default for SimulationEngine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationEngine<StdRng> {
    /// Create an engine seeded from system entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an engine with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SimulationEngine<R> {
    /// Create an engine drawing from the given generator, starting at the idle floor
    pub fn with_rng(rng: R) -> Self {
        Self {
            state: SimulationState::new(IDLE_FLOOR_RPM, 0),
            rng,
            ticks: 0,
        }
    }

    /// Current simulated values
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Number of ticks run so far
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Advance one tick using the stored RPM
    pub fn tick(&mut self, profile: &ProfileDefinition) -> SimulationState {
        let (rpm, torque) = self.step(self.state.rpm, profile);
        self.state = SimulationState::new(rpm, torque);
        self.ticks += 1;
        self.state
    }

    /// Compute the next `(rpm, torque)` from `current_rpm` without touching stored state
    pub fn step(&mut self, current_rpm: i32, profile: &ProfileDefinition) -> (i32, i32) {
        let max = i64::from(profile.max_rpm.min(MAX_PROFILE_RPM));
        let delta = self.rng.gen_range(DELTA_MIN..=DELTA_MAX);
        let candidate = i64::from(current_rpm) + i64::from(delta);

        let next = if candidate < i64::from(IDLE_FLOOR_RPM) {
            i64::from(IDLE_FLOOR_RPM + self.rng.gen_range(0..=IDLE_JITTER))
        } else if 100 * candidate > 95 * max {
            (95 * max) / 100 - i64::from(self.rng.gen_range(0..=LIMITER_JITTER))
        } else {
            candidate
        };

        // Profiles with a ceiling near the idle floor can push the jittered value
        // outside the axis.
        let rpm = next.clamp(0, max) as i32;
        (rpm, torque_at(rpm, profile.max_rpm))
    }

    /// Pull the stored state back into the bounds of `profile`.
    ///
    /// Called after a profile switch so the next frame never shows an RPM above the new
    /// ceiling.
    pub fn rebase(&mut self, profile: &ProfileDefinition) -> SimulationState {
        let rpm = self.state.rpm.clamp(0, profile.max_rpm.min(MAX_PROFILE_RPM) as i32);
        self.state = SimulationState::new(rpm, torque_at(rpm, profile.max_rpm));
        self.state
    }
}
