// Three-phase sine generation for sinusoidal commutation
// One cosine/sine evaluation followed by an inverse Clarke rotation yields the
// three phase sines 120° apart.

use core::f32::consts::PI;
use libm::{cosf, sinf};

use crate::angle::wrap;

/// Source of the cosine/sine pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SineSource {
    /// `idsp::cossin()` fixed-point approximation (~40 cycles on Cortex-M)
    Idsp,
    /// `libm::cosf` / `libm::sinf` (~100-200 cycles)
    Libm,
}

/// Source used by `phase_sines()`
pub const DEFAULT_SINE_SOURCE: SineSource = SineSource::Idsp;

/// Sines of `angle`, `angle + 120°` and `angle + 240°`
///
/// # Arguments
/// * `angle` - Electrical angle in radians, any finite value
///
/// # Returns
/// Tuple of (sin_u, sin_v, sin_w), each in [-1, 1]
#[inline]
pub fn phase_sines(angle: f32) -> (f32, f32, f32) {
    phase_sines_with(DEFAULT_SINE_SOURCE, angle)
}

/// `phase_sines()` with an explicit cosine/sine implementation
pub fn phase_sines_with(source: SineSource, angle: f32) -> (f32, f32, f32) {
    // The fixed-point phase only covers one turn
    let angle = wrap(angle);
    let (cos_theta, sin_theta) = match source {
        SineSource::Idsp => cos_sin_idsp(angle),
        SineSource::Libm => cos_sin_libm(angle),
    };
    // sin(θ + k·120°) is the inverse Clarke transform of (sin θ, cos θ)
    inverse_clarke(sin_theta, cos_theta)
}

/// Cosine and sine via idsp::cossin() (fast, fixed point)
#[inline]
fn cos_sin_idsp(angle: f32) -> (f32, f32) {
    // idsp uses the full i32 range for -π to π
    const SCALE: f32 = 2147483648.0 / PI; // 2^31 / π
    // Saturating cast: +π lands on i32::MAX
    let phase: i32 = (angle * SCALE) as i32;

    let (cos_i32, sin_i32) = idsp::cossin(phase);

    const I32_TO_F32: f32 = 1.0 / 2147483648.0; // 1 / 2^31
    (cos_i32 as f32 * I32_TO_F32, sin_i32 as f32 * I32_TO_F32)
}

/// Cosine and sine via libm
#[inline]
fn cos_sin_libm(angle: f32) -> (f32, f32) {
    (cosf(angle), sinf(angle))
}

/// Inverse Clarke transformation (αβ → uvw)
///
/// # Arguments
/// * `v_alpha` - Alpha component
/// * `v_beta` - Beta component
///
/// # Returns
/// Tuple of (v_u, v_v, v_w); the three always sum to zero
pub fn inverse_clarke(v_alpha: f32, v_beta: f32) -> (f32, f32, f32) {
    const SQRT3_DIV_2: f32 = 0.866_025_4; // sqrt(3) / 2
    const ONE_DIV_2: f32 = 0.5;

    let v_u = v_alpha;
    let v_v = -ONE_DIV_2 * v_alpha + SQRT3_DIV_2 * v_beta;
    let v_w = -ONE_DIV_2 * v_alpha - SQRT3_DIV_2 * v_beta;

    (v_u, v_v, v_w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::TAU;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_inverse_clarke() {
        let (v_u, v_v, v_w) = inverse_clarke(1.0, 0.0);
        assert!(approx_eq(v_u, 1.0));
        assert!(approx_eq(v_v, -0.5));
        assert!(approx_eq(v_w, -0.5));
        // Sum should be zero for balanced three-phase
        assert!(approx_eq(v_u + v_v + v_w, 0.0));
    }

    #[test]
    fn test_phase_sines_match_shifted_sine() {
        let offset_v = TAU / 3.0;
        let offset_w = 2.0 * TAU / 3.0;
        for source in [SineSource::Libm, SineSource::Idsp] {
            for i in 0..360 {
                let angle = -PI + TAU * (i as f32 + 0.5) / 360.0;
                let (u, v, w) = phase_sines_with(source, angle);
                assert!(approx_eq(u, sinf(angle)), "{:?} u at {}", source, angle);
                assert!(approx_eq(v, sinf(angle + offset_v)), "{:?} v at {}", source, angle);
                assert!(approx_eq(w, sinf(angle + offset_w)), "{:?} w at {}", source, angle);
            }
        }
    }

    #[test]
    fn test_phase_sines_outside_one_turn() {
        for source in [SineSource::Libm, SineSource::Idsp] {
            for angle in [3.5, -4.0, 4.0, 2.0 * TAU + 1.0, -10.0] {
                let (u, v, w) = phase_sines_with(source, angle);
                assert!(approx_eq(u, sinf(angle)), "{:?} u at {}", source, angle);
                assert!(approx_eq(v, sinf(angle + TAU / 3.0)), "{:?} v at {}", source, angle);
                assert!(approx_eq(w, sinf(angle + 2.0 * TAU / 3.0)), "{:?} w at {}", source, angle);
            }
        }
    }

    #[test]
    fn test_phase_sines_at_pi() {
        let (u, v, w) = phase_sines(PI);
        assert!(approx_eq(u, 0.0));
        assert!(approx_eq(v, sinf(PI + TAU / 3.0)));
        assert!(approx_eq(w, sinf(PI + 2.0 * TAU / 3.0)));
    }
}
