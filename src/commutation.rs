//! Sinusoidal commutation driver
//!
//! Runs once per commutation tick. Combines the two half-cycle resolver
//! estimates into a rotor angle, gates the drive on signal quality and turns
//! the pole-scaled commutation angle into three PWM duty cycles 120° apart.

pub mod transforms;

pub use transforms::{inverse_clarke, phase_sines, phase_sines_with, SineSource};

use libm::roundf;

use crate::angle::{mean, wrap};
use crate::config::CommutationConfig;
use crate::state::ResolverSnapshot;

/// Duty cycles as fractions of the PWM period, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseDuties {
    pub u: f32,
    pub v: f32,
    pub w: f32,
}

impl PhaseDuties {
    /// All phases at 50%: zero average voltage across the windings
    pub const IDLE: Self = Self {
        u: 0.5,
        v: 0.5,
        w: 0.5,
    };

    /// Convert to timer compare values
    ///
    /// # Arguments
    /// * `max_duty` - Compare value for 100% duty
    ///
    /// # Returns
    /// Tuple of (duty_u, duty_v, duty_w) in [0, max_duty]
    pub fn to_compare(&self, max_duty: u16) -> (u16, u16, u16) {
        let max = max_duty as f32;
        let scale = |d: f32| roundf(d * max).clamp(0.0, max) as u16;
        (scale(self.u), scale(self.v), scale(self.w))
    }
}

impl Default for PhaseDuties {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Result of one commutation tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommutationOutput {
    /// Pole-scaled commutation angle [rad], (-π, π]
    pub angle: f32,
    /// Drive gate, 0.0 or 1.0
    pub duty_scale: f32,
    /// Duty cycles to write
    pub duties: PhaseDuties,
}

/// Signal quality gate
///
/// # Returns
/// 0.0 when either amplitude is below `threshold`, 1.0 otherwise (an
/// amplitude exactly at the threshold passes)
pub fn duty_gate(snapshot: &ResolverSnapshot, threshold: u32) -> f32 {
    if snapshot.amplitude_rising < threshold || snapshot.amplitude_falling < threshold {
        0.0
    } else {
        1.0
    }
}

/// Commutation angle from the two resolver estimates
///
/// `pole_count · (mean − offset) ± lead`, wrapped into (-π, π]. The field
/// leads the rotor while the gate is open and lags it otherwise.
pub fn commutation_angle(
    snapshot: &ResolverSnapshot,
    config: &CommutationConfig,
    duty_scale: f32,
) -> f32 {
    let rotor = mean(snapshot.angle_rising, snapshot.angle_falling);
    let lead = if duty_scale > 0.0 {
        config.field_lead
    } else {
        -config.field_lead
    };
    wrap(config.pole_count as f32 * (rotor - config.resolver_offset) + lead)
}

/// Sinusoidal duty cycles for a commutation angle
///
/// `duty = (sin(angle + phase) · pwm_scale · |duty_scale| + 1) / 2`
pub fn phase_duties(angle: f32, pwm_scale: f32, duty_scale: f32) -> PhaseDuties {
    let amplitude = pwm_scale * duty_scale.abs().clamp(0.0, 1.0);
    let (sin_u, sin_v, sin_w) = phase_sines(angle);

    PhaseDuties {
        u: (sin_u * amplitude + 1.0) / 2.0,
        v: (sin_v * amplitude + 1.0) / 2.0,
        w: (sin_w * amplitude + 1.0) / 2.0,
    }
}

/// Commutation driver
pub struct CommutationDriver {
    config: CommutationConfig,
    /// Gate state of the previous tick (for transition logging)
    gate_open: bool,
}

impl CommutationDriver {
    pub fn new(config: CommutationConfig) -> Self {
        Self {
            config,
            gate_open: false,
        }
    }

    pub fn config(&self) -> &CommutationConfig {
        &self.config
    }

    /// Gate state after the last tick
    pub fn is_gate_open(&self) -> bool {
        self.gate_open
    }

    /// Run one commutation tick on the latest resolver estimates
    pub fn update(&mut self, snapshot: &ResolverSnapshot) -> CommutationOutput {
        let duty_scale = duty_gate(snapshot, self.config.amplitude_threshold);

        let open = duty_scale > 0.0;
        if open != self.gate_open {
            if open {
                info!(
                    "Resolver signal OK (amplitudes {}/{}), drive enabled",
                    snapshot.amplitude_rising,
                    snapshot.amplitude_falling
                );
            } else {
                warn!(
                    "Resolver signal lost (amplitudes {}/{} < {}), drive idle",
                    snapshot.amplitude_rising,
                    snapshot.amplitude_falling,
                    self.config.amplitude_threshold
                );
            }
            self.gate_open = open;
        }

        let angle = commutation_angle(snapshot, &self.config, duty_scale);
        let duties = phase_duties(angle, self.config.pwm_scale, duty_scale);

        CommutationOutput {
            angle,
            duty_scale,
            duties,
        }
    }
}

impl Default for CommutationDriver {
    fn default() -> Self {
        Self::new(CommutationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::{deg, minus};
    use core::f32::consts::{PI, TAU};

    const EPSILON: f32 = 1e-4;

    fn snapshot(angle: f32, amplitude: u32) -> ResolverSnapshot {
        ResolverSnapshot {
            angle_rising: angle,
            angle_falling: angle,
            amplitude_rising: amplitude,
            amplitude_falling: amplitude,
        }
    }

    #[test]
    fn test_gate_threshold() {
        let threshold = 1_000_000;
        assert_eq!(duty_gate(&snapshot(0.0, 999_999), threshold), 0.0);
        assert_eq!(duty_gate(&snapshot(0.0, 1_000_000), threshold), 1.0);
        assert_eq!(duty_gate(&snapshot(0.0, 4_000_000), threshold), 1.0);

        // Either half-cycle alone closes the gate
        let mut s = snapshot(0.0, 4_000_000);
        s.amplitude_falling = 10;
        assert_eq!(duty_gate(&s, threshold), 0.0);
        let mut s = snapshot(0.0, 4_000_000);
        s.amplitude_rising = 10;
        assert_eq!(duty_gate(&s, threshold), 0.0);
    }

    #[test]
    fn test_closed_gate_idles_at_half_duty() {
        let mut driver = CommutationDriver::default();
        for i in 0..36 {
            let angle = -PI + TAU * (i as f32 + 1.0) / 36.0;
            let output = driver.update(&snapshot(angle, 0));
            assert_eq!(output.duty_scale, 0.0);
            assert_eq!(output.duties, PhaseDuties::IDLE);
        }
        assert!(!driver.is_gate_open());
    }

    #[test]
    fn test_commutation_angle_formula() {
        let config = CommutationConfig::default();
        let s = snapshot(deg(30.0), 2_000_000);

        let driving = commutation_angle(&s, &config, 1.0);
        let expected = wrap(4.0 * (deg(30.0) - deg(52.0)) + deg(90.0));
        assert!(minus(driving, expected).abs() < EPSILON);

        let idle = commutation_angle(&s, &config, 0.0);
        let expected = wrap(4.0 * (deg(30.0) - deg(52.0)) - deg(90.0));
        assert!(minus(idle, expected).abs() < EPSILON);
    }

    #[test]
    fn test_average_across_boundary() {
        let config = CommutationConfig {
            pole_count: 1,
            resolver_offset: 0.0,
            field_lead: 0.0,
            ..Default::default()
        };
        let s = ResolverSnapshot {
            angle_rising: deg(179.0),
            angle_falling: deg(-179.0),
            amplitude_rising: 2_000_000,
            amplitude_falling: 2_000_000,
        };
        // Naive averaging would give 0°
        let angle = commutation_angle(&s, &config, 1.0);
        assert!(minus(angle, PI).abs() < EPSILON);
    }

    #[test]
    fn test_angle_always_wrapped() {
        let config = CommutationConfig::default();
        for i in 0..720 {
            let angle = -PI + TAU * (i as f32 + 1.0) / 720.0;
            for scale in [0.0, 1.0] {
                let a = commutation_angle(&snapshot(angle, 0), &config, scale);
                assert!(a > -PI && a <= PI);
            }
        }
    }

    #[test]
    fn test_duty_sum_constant_and_in_range() {
        for i in 0..1000 {
            let angle = -PI + TAU * (i as f32 + 1.0) / 1000.0;
            let d = phase_duties(angle, 0.9, 1.0);
            assert!((d.u + d.v + d.w - 1.5).abs() < EPSILON, "sum at {}", angle);
            for x in [d.u, d.v, d.w] {
                assert!((0.0..=1.0).contains(&x));
                assert!((0.05 - EPSILON..=0.95 + EPSILON).contains(&x));
            }

            let (cu, cv, cw) = d.to_compare(4249);
            assert!(cu <= 4249 && cv <= 4249 && cw <= 4249);
        }
    }

    #[test]
    fn test_phase_duties_values() {
        let d = phase_duties(PI / 2.0, 0.9, 1.0);
        assert!((d.u - 0.95).abs() < EPSILON);
        assert!((d.v - (1.0 + 0.9 * libm::sinf(PI / 2.0 + TAU / 3.0)) / 2.0).abs() < EPSILON);

        // Angles beyond one turn behave like their wrapped value
        let d = phase_duties(4.0, 0.9, 1.0);
        assert!((d.u - (1.0 + 0.9 * libm::sinf(4.0)) / 2.0).abs() < EPSILON);

        // Negative gate values act like their magnitude
        assert_eq!(phase_duties(0.3, 0.9, -1.0), phase_duties(0.3, 0.9, 1.0));
    }

    #[test]
    fn test_to_compare() {
        assert_eq!(PhaseDuties::IDLE.to_compare(100), (50, 50, 50));
        let d = PhaseDuties {
            u: 0.0,
            v: 1.0,
            w: 1.2,
        };
        assert_eq!(d.to_compare(1000), (0, 1000, 1000));
    }

    #[test]
    fn test_gate_transitions_tracked() {
        let mut driver = CommutationDriver::default();
        assert!(!driver.is_gate_open());
        let out = driver.update(&snapshot(0.5, 2_000_000));
        assert_eq!(out.duty_scale, 1.0);
        assert!(driver.is_gate_open());
        driver.update(&snapshot(0.5, 0));
        assert!(!driver.is_gate_open());
    }
}
