//! Torque curve
//!
//! Piecewise curve over the fraction of the profile's rev ceiling: parabolic below
//! 30%, linear up to 70%, declining above. Evaluated in integer arithmetic so the floor
//! of each segment is exact.

use super::MAX_TORQUE;

/// Raw torque for `rpm` before clamping to the torque axis.
///
/// * `rpm < 0.3 * max_rpm`: `floor(50 + 0.0005 * rpm^2)`
/// * `rpm < 0.7 * max_rpm`: `floor(200 + 0.2 * rpm)`
/// * otherwise: `floor(350 - 0.3 * (rpm - 0.7 * max_rpm))`
pub fn raw_torque_at(rpm: i32, max_rpm: u32) -> i64 {
    let rpm = i64::from(rpm);
    let max = i64::from(max_rpm);

    if 10 * rpm < 3 * max {
        50 + (rpm * rpm).div_euclid(2000)
    } else if 10 * rpm < 7 * max {
        200 + rpm.div_euclid(5)
    } else {
        350 + (21 * max - 30 * rpm).div_euclid(100)
    }
}

/// Torque for `rpm`, clamped to `[0, MAX_TORQUE]`
pub fn torque_at(rpm: i32, max_rpm: u32) -> i32 {
    raw_torque_at(rpm, max_rpm).clamp(0, i64::from(MAX_TORQUE)) as i32
}
