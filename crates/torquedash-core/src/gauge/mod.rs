//! Gauges
//!
//! Axis definitions for the cluster gauges and the animator that smooths simulated
//! values into displayed ones.

mod animator;

pub use animator::{DisplayedValue, GaugeAnimator};

use serde::{Deserialize, Serialize};

use crate::profile::{ProfileDefinition, MAX_PROFILE_RPM};
use crate::sim::MAX_TORQUE;

/// Redline position as a fraction of the rev ceiling (6500 on an 8000 RPM dial)
const REDLINE_FRACTION: f64 = 6500.0 / 8000.0;

/// Gauges on the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GaugeId {
    /// Engine speed
    #[serde(rename = "rpm")]
    Rpm,
    /// Engine torque
    #[serde(rename = "torque")]
    Torque,
}

impl GaugeId {
    /// All gauges in display order
    pub fn all() -> &'static [GaugeId] {
        &[GaugeId::Rpm, GaugeId::Torque]
    }
}

/// Zone a value falls in on its axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GaugeZone {
    /// Below the redline, or the axis has none
    Normal,
    /// At or above the redline
    Redline,
}

/// Display range of a gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaugeAxis {
    /// Minimum display value
    pub min: i32,
    /// Maximum display value
    pub max: i32,
    /// Start of the redline zone, if the gauge has one
    pub redline: Option<i32>,
}

impl GaugeAxis {
    /// RPM axis for a profile: `0..max_rpm` with the redline at 6500/8000 of the ceiling
    pub fn rpm_for(profile: &ProfileDefinition) -> Self {
        let max = profile.max_rpm.min(MAX_PROFILE_RPM) as i32;
        Self {
            min: 0,
            max,
            redline: Some((f64::from(max) * REDLINE_FRACTION).round() as i32),
        }
    }

    /// Fixed torque axis
    pub fn torque() -> Self {
        Self {
            min: 0,
            max: MAX_TORQUE,
            redline: None,
        }
    }

    /// Clamp a value onto the axis
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }

    /// Zone of a value
    pub fn zone(&self, value: i32) -> GaugeZone {
        match self.redline {
            Some(redline) if value >= redline => GaugeZone::Redline,
            _ => GaugeZone::Normal,
        }
    }

    /// Position of a value along the axis in `[0, 1]`
    pub fn fraction(&self, value: i32) -> f64 {
        let span = f64::from(self.max - self.min);
        if span <= 0.0 {
            return 0.0;
        }
        f64::from(self.clamp(value) - self.min) / span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpm_axis_redline() {
        let sport = ProfileDefinition::new("Sport", 8000, 1.2, None);
        let axis = GaugeAxis::rpm_for(&sport);
        assert_eq!(axis.max, 8000);
        assert_eq!(axis.redline, Some(6500));
        assert_eq!(axis.zone(6499), GaugeZone::Normal);
        assert_eq!(axis.zone(6500), GaugeZone::Redline);
    }

    #[test]
    fn test_torque_axis_has_no_redline() {
        let axis = GaugeAxis::torque();
        assert_eq!(axis.zone(500), GaugeZone::Normal);
        assert_eq!(axis.clamp(900), 500);
        assert_eq!(axis.clamp(-5), 0);
        assert_eq!(axis.fraction(250), 0.5);
    }
}
