//! Engine Simulation
//!
//! Advances RPM and torque tick by tick according to the active driving profile.

mod curve;
mod engine;

pub use curve::torque_at;
pub use engine::SimulationEngine;

use serde::{Deserialize, Serialize};

/// Lowest RPM the simulated engine settles at before idle jitter
pub const IDLE_FLOOR_RPM: i32 = 800;

/// Upper bound of the torque axis
pub const MAX_TORQUE: i32 = 500;

/// Current simulated values, one per gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SimulationState {
    /// Engine speed, within `[0, max_rpm]` of the active profile
    pub rpm: i32,
    /// Torque derived from `rpm`, within `[0, MAX_TORQUE]`
    pub torque: i32,
}

impl SimulationState {
    /// Create a new state
    pub fn new(rpm: i32, torque: i32) -> Self {
        Self { rpm, torque }
    }
}
