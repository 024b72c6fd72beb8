//! Angle arithmetic on the (-π, π] circle
//!
//! Every place that combines two resolver angles goes through these helpers.
//! Direct subtraction of raw angles is discontinuous at ±π.

use core::f32::consts::{PI, TAU};

/// Shortest-arc signed difference `a - b`
///
/// # Arguments
/// * `a` - Angle in radians, expected in (-π, π]
/// * `b` - Angle in radians, expected in (-π, π]
///
/// # Returns
/// Signed difference in (-π, π]
pub fn minus(a: f32, b: f32) -> f32 {
    let diff = a - b;
    if diff > PI {
        diff - TAU
    } else if diff <= -PI {
        diff + TAU
    } else {
        diff
    }
}

/// Normalize an arbitrary angle into (-π, π]
///
/// Uses a remainder instead of a bounded number of turn corrections, so inputs
/// many turns away from the range are handled in constant time.
pub fn wrap(angle: f32) -> f32 {
    let mut wrapped = libm::remainderf(angle, TAU);
    // remainderf() yields [-π, π]; fold the closed lower end onto +π
    if wrapped <= -PI {
        wrapped += TAU;
    }
    wrapped
}

/// Mean of two angles along the shorter arc between them
#[inline]
pub fn mean(a: f32, b: f32) -> f32 {
    wrap(b + minus(a, b) / 2.0)
}

/// Degrees to radians
#[inline]
pub fn deg(degrees: f32) -> f32 {
    degrees * PI / 180.0
}

/// Radians to degrees
#[inline]
pub fn rad(radians: f32) -> f32 {
    radians * 180.0 / PI
}
