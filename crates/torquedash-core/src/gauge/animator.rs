//! Gauge animator
//!
//! Moves each displayed value linearly toward its latest target. The animation lasts
//! two milliseconds per unit of change, so big jumps sweep and small ones snap. A new
//! target replaces the running animation and starts from whatever is on screen at that
//! moment.
//!
//! Time is passed in explicitly as milliseconds since an arbitrary epoch; the animator
//! never sleeps or schedules anything itself.

use std::collections::HashMap;

use super::GaugeId;

/// Animation length per unit of change (ms)
const MS_PER_UNIT: u64 = 2;

/// The value shown by one gauge, interpolating from `start` to `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayedValue {
    start: i32,
    target: i32,
    start_ms: u64,
    duration_ms: u64,
}

impl DisplayedValue {
    /// A value that is not moving
    pub fn at_rest(value: i32) -> Self {
        Self {
            start: value,
            target: value,
            start_ms: 0,
            duration_ms: 0,
        }
    }

    /// Value shown at `now_ms`
    pub fn value_at(&self, now_ms: u64) -> i32 {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        if elapsed >= self.duration_ms {
            return self.target;
        }
        // Spans near the full i32 range overflow an i64 product
        let delta = i128::from(self.target) - i128::from(self.start);
        let step = delta * i128::from(elapsed) / i128::from(self.duration_ms);
        (i128::from(self.start) + step) as i32
    }

    /// Value the animation ends on
    pub fn target(&self) -> i32 {
        self.target
    }

    /// Length of the current animation
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Whether the value is still moving at `now_ms`
    pub fn is_animating(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) < self.duration_ms
    }
}

/// Per-gauge animation state
#[derive(Debug, Clone, Default)]
pub struct GaugeAnimator {
    gauges: HashMap<GaugeId, DisplayedValue>,
}

impl GaugeAnimator {
    /// Create an animator with every gauge resting at zero
    pub fn new() -> Self {
        let gauges = GaugeId::all()
            .iter()
            .map(|id| (*id, DisplayedValue::at_rest(0)))
            .collect();
        Self { gauges }
    }

    /// Animate `gauge` toward `target`, starting from the value displayed at `now_ms`.
    ///
    /// Returns the animation duration in milliseconds.
    pub fn animate(&mut self, gauge: GaugeId, target: i32, now_ms: u64) -> u64 {
        let current = self.displayed(gauge, now_ms);
        self.animate_from(gauge, current, target, now_ms)
    }

    /// Animate `gauge` from an explicit `current_displayed` value toward `target`
    pub fn animate_from(
        &mut self,
        gauge: GaugeId,
        current_displayed: i32,
        target: i32,
        now_ms: u64,
    ) -> u64 {
        let distance = (i64::from(target) - i64::from(current_displayed)).unsigned_abs();
        let duration_ms = MS_PER_UNIT * distance;
        self.gauges.insert(
            gauge,
            DisplayedValue {
                start: current_displayed,
                target,
                start_ms: now_ms,
                duration_ms,
            },
        );
        duration_ms
    }

    /// Jump a gauge straight to `value` without animating
    pub fn snap(&mut self, gauge: GaugeId, value: i32) {
        self.gauges.insert(gauge, DisplayedValue::at_rest(value));
    }

    /// Value shown by `gauge` at `now_ms`
    pub fn displayed(&self, gauge: GaugeId, now_ms: u64) -> i32 {
        self.gauges
            .get(&gauge)
            .map(|v| v.value_at(now_ms))
            .unwrap_or_default()
    }

    /// Animation state of `gauge`
    pub fn state(&self, gauge: GaugeId) -> Option<&DisplayedValue> {
        self.gauges.get(&gauge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_is_proportional() {
        let mut animator = GaugeAnimator::new();
        assert_eq!(animator.animate(GaugeId::Rpm, 1000, 0), 2000);
        assert_eq!(animator.animate(GaugeId::Torque, -50, 0), 100);
    }

    #[test]
    fn test_linear_interpolation() {
        let mut animator = GaugeAnimator::new();
        animator.animate(GaugeId::Rpm, 1000, 100);

        assert_eq!(animator.displayed(GaugeId::Rpm, 100), 0);
        assert_eq!(animator.displayed(GaugeId::Rpm, 600), 250);
        assert_eq!(animator.displayed(GaugeId::Rpm, 1100), 500);
        assert_eq!(animator.displayed(GaugeId::Rpm, 2100), 1000);
        assert_eq!(animator.displayed(GaugeId::Rpm, 99_999), 1000);
    }

    #[test]
    fn test_downward_animation() {
        let mut animator = GaugeAnimator::new();
        animator.snap(GaugeId::Rpm, 3000);
        animator.animate(GaugeId::Rpm, 1000, 0);
        assert_eq!(animator.displayed(GaugeId::Rpm, 2000), 2000);
        assert_eq!(animator.displayed(GaugeId::Rpm, 4000), 1000);
    }

    #[test]
    fn test_supersede_restarts_from_displayed_value() {
        let mut animator = GaugeAnimator::new();
        animator.animate(GaugeId::Rpm, 1000, 0);

        // Halfway through, 500 is displayed; retarget to 700
        let duration = animator.animate(GaugeId::Rpm, 700, 1000);
        assert_eq!(duration, 400);
        assert_eq!(animator.displayed(GaugeId::Rpm, 1000), 500);
        assert_eq!(animator.displayed(GaugeId::Rpm, 1200), 600);
        assert_eq!(animator.displayed(GaugeId::Rpm, 1400), 700);
    }

    #[test]
    fn test_ends_on_last_target_after_many_supersessions() {
        let mut animator = GaugeAnimator::new();
        let targets = [4000, 120, 7333, 801, 6999, 2501];
        let mut now = 0;
        let mut last_duration = 0;
        for target in targets {
            last_duration = animator.animate(GaugeId::Rpm, target, now);
            now += 37;
        }
        let finished = now - 37 + last_duration;
        assert_eq!(animator.displayed(GaugeId::Rpm, finished), 2501);
        assert!(!animator.state(GaugeId::Rpm).unwrap().is_animating(finished));
    }

    #[test]
    fn test_full_range_sweep() {
        let mut animator = GaugeAnimator::new();
        let duration = animator.animate_from(GaugeId::Rpm, i32::MIN, i32::MAX, 0);
        assert_eq!(duration, 2 * u64::from(u32::MAX));

        assert_eq!(animator.displayed(GaugeId::Rpm, 0), i32::MIN);
        assert_eq!(animator.displayed(GaugeId::Rpm, duration / 2), -1);
        let near_end = animator.displayed(GaugeId::Rpm, duration - 1);
        assert!(near_end > i32::MAX - 2 && near_end < i32::MAX);
        assert_eq!(animator.displayed(GaugeId::Rpm, duration), i32::MAX);
    }

    #[test]
    fn test_same_target_is_immediate() {
        let mut animator = GaugeAnimator::new();
        animator.snap(GaugeId::Torque, 300);
        assert_eq!(animator.animate(GaugeId::Torque, 300, 10), 0);
        assert_eq!(animator.displayed(GaugeId::Torque, 10), 300);
    }
}
