// Resolver demodulation
// Recovers rotor angle and signal strength from synchronously sampled
// sine/cosine resolver channels. One sample pair is taken per excitation
// half-cycle; the excitation polarity alternates on every call.

use libm::atan2f;

use crate::angle::wrap;

use crate::config::{DemodulatorConfig, HalfCycleAssignment};
use crate::conversion::SamplePair;

/// Excitation half-cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExcitationPhase {
    Rising,
    Falling,
}

impl ExcitationPhase {
    /// The other half-cycle
    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            ExcitationPhase::Rising => ExcitationPhase::Falling,
            ExcitationPhase::Falling => ExcitationPhase::Rising,
        }
    }

    /// Level of the excitation output during this half-cycle
    #[inline]
    pub fn excitation_high(self) -> bool {
        self == ExcitationPhase::Rising
    }
}

/// Angle and amplitude recovered on one half-cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HalfCycleEstimate {
    /// Half-cycle the estimate belongs to
    pub phase: ExcitationPhase,
    /// Resolver angle in radians, (-π, π]
    pub angle: f32,
    /// Squared magnitude of the offset-corrected channels (ADC counts²)
    pub amplitude: u32,
}

/// Smoothed DC offset of both channels
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Centers {
    pub a: f32,
    pub b: f32,
}

/// Resolver demodulator state machine
pub struct ResolverDemodulator {
    /// Smoothing and half-cycle mapping
    config: DemodulatorConfig,
    /// Center estimates, `None` until the first pair seeds them
    centers: Option<Centers>,
    /// Pair of the previous call
    previous: Option<SamplePair>,
    /// Half-cycle the next pair belongs to
    phase: ExcitationPhase,
    /// Excitation running; before that only the centers are tracked
    excitation_enabled: bool,
}

impl ResolverDemodulator {
    /// Create a demodulator in baseline mode (excitation disabled)
    pub fn new(config: DemodulatorConfig) -> Self {
        Self {
            config,
            centers: None,
            previous: None,
            phase: ExcitationPhase::Falling,
            excitation_enabled: false,
        }
    }

    /// Start demodulating; until then samples only refine the centers
    pub fn enable_excitation(&mut self) {
        self.excitation_enabled = true;
    }

    pub fn is_excitation_enabled(&self) -> bool {
        self.excitation_enabled
    }

    /// Half-cycle the next pair will be attributed to
    pub fn phase(&self) -> ExcitationPhase {
        self.phase
    }

    /// Current center estimates
    pub fn centers(&self) -> Option<Centers> {
        self.centers
    }

    /// Process one completed conversion
    ///
    /// # Arguments
    /// * `pair` - Raw readings of both channels
    ///
    /// # Returns
    /// The half-cycle estimate when excitation is enabled, `None` during the
    /// baseline measurement
    pub fn update(&mut self, pair: SamplePair) -> Option<HalfCycleEstimate> {
        let a = pair.a as f32;
        let b = pair.b as f32;
        let retain = self.config.center_retain;
        let gain = 1.0 - retain;

        let centers = match self.centers {
            // First pair seeds the centers as-is, (0, 0) included
            None => Centers { a, b },
            Some(c) if self.excitation_enabled => {
                // The midpoint of consecutive half-cycles cancels the excitation
                let prev = self.previous.unwrap_or(pair);
                let mid_a = (a + prev.a as f32) / 2.0;
                let mid_b = (b + prev.b as f32) / 2.0;
                Centers {
                    a: c.a * retain + mid_a * gain,
                    b: c.b * retain + mid_b * gain,
                }
            }
            Some(c) => Centers {
                a: c.a * retain + a * gain,
                b: c.b * retain + b * gain,
            },
        };
        self.centers = Some(centers);

        let estimate = if self.excitation_enabled {
            Some(self.demodulate(pair, centers))
        } else {
            None
        };

        self.previous = Some(pair);
        self.phase = self.phase.toggled();

        estimate
    }

    fn demodulate(&self, pair: SamplePair, centers: Centers) -> HalfCycleEstimate {
        let mut delta_a = pair.a as f32 - centers.a;
        let mut delta_b = pair.b as f32 - centers.b;

        let positive = match self.config.half_cycles {
            HalfCycleAssignment::Normal => self.phase == ExcitationPhase::Rising,
            HalfCycleAssignment::Swapped => self.phase == ExcitationPhase::Falling,
        };
        if !positive {
            delta_a = -delta_a;
            delta_b = -delta_b;
        }

        // atan2f(-0.0, negative) is -π; fold onto +π
        let angle = wrap(atan2f(delta_a, delta_b));
        // Saturating cast; a full-scale 12-bit swing stays far below u32::MAX
        let amplitude = (delta_a * delta_a + delta_b * delta_b) as u32;

        HalfCycleEstimate {
            phase: self.phase,
            angle,
            amplitude,
        }
    }
}

impl Default for ResolverDemodulator {
    fn default() -> Self {
        Self::new(DemodulatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::{deg, minus};
    use core::f32::consts::PI;

    const CENTER_A: f32 = 2048.0;
    const CENTER_B: f32 = 1990.0;
    const AMPLITUDE: f32 = 1500.0;

    /// Excitation-modulated resolver reading for the given half-cycle
    fn resolver_pair(theta: f32, phase: ExcitationPhase) -> SamplePair {
        let sign = if phase == ExcitationPhase::Rising {
            1.0
        } else {
            -1.0
        };
        let a = CENTER_A + sign * AMPLITUDE * libm::sinf(theta);
        let b = CENTER_B + sign * AMPLITUDE * libm::cosf(theta);
        SamplePair::new(libm::roundf(a) as u16, libm::roundf(b) as u16)
    }

    fn baseline_pair() -> SamplePair {
        SamplePair::new(CENTER_A as u16, CENTER_B as u16)
    }

    fn converged_demodulator() -> ResolverDemodulator {
        let mut demod = ResolverDemodulator::default();
        for _ in 0..100 {
            assert_eq!(demod.update(baseline_pair()), None);
        }
        demod.enable_excitation();
        demod
    }

    #[test]
    fn test_phase_alternates() {
        let mut demod = ResolverDemodulator::default();
        assert_eq!(demod.phase(), ExcitationPhase::Falling);
        demod.update(baseline_pair());
        assert_eq!(demod.phase(), ExcitationPhase::Rising);
        demod.update(baseline_pair());
        assert_eq!(demod.phase(), ExcitationPhase::Falling);
    }

    #[test]
    fn test_first_pair_seeds_centers() {
        let mut demod = ResolverDemodulator::default();
        assert_eq!(demod.centers(), None);

        demod.update(SamplePair::new(1000, 3000));
        assert_eq!(demod.centers(), Some(Centers { a: 1000.0, b: 3000.0 }));

        demod.update(SamplePair::new(2000, 3000));
        let centers = demod.centers().unwrap();
        assert!((centers.a - 1050.0).abs() < 1e-3);
        assert!((centers.b - 3000.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_first_pair_is_a_seed() {
        let mut demod = ResolverDemodulator::default();
        demod.update(SamplePair::new(0, 0));
        assert_eq!(demod.centers(), Some(Centers { a: 0.0, b: 0.0 }));

        // A real signal afterwards is smoothed in, not re-seeded
        demod.update(SamplePair::new(2000, 2000));
        let centers = demod.centers().unwrap();
        assert!((centers.a - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_baseline_produces_no_estimate() {
        let mut demod = ResolverDemodulator::default();
        for _ in 0..10 {
            assert_eq!(demod.update(baseline_pair()), None);
        }
        assert!(!demod.is_excitation_enabled());
    }

    #[test]
    fn test_recovers_angle_on_both_half_cycles() {
        let mut step = -179;
        while step <= 180 {
            let theta = deg(step as f32);
            let mut demod = converged_demodulator();
            let mut last_rising = None;
            let mut last_falling = None;

            for _ in 0..200 {
                let pair = resolver_pair(theta, demod.phase());
                let estimate = demod.update(pair).unwrap();
                match estimate.phase {
                    ExcitationPhase::Rising => last_rising = Some(estimate),
                    ExcitationPhase::Falling => last_falling = Some(estimate),
                }
            }

            for estimate in [last_rising.unwrap(), last_falling.unwrap()] {
                let error = minus(estimate.angle, theta).abs();
                assert!(
                    error < 2e-3,
                    "theta={}° phase={:?} angle={} error={}",
                    step,
                    estimate.phase,
                    estimate.angle,
                    error
                );
                assert!(estimate.angle > -PI && estimate.angle <= PI);
                let expected = AMPLITUDE * AMPLITUDE;
                assert!((estimate.amplitude as f32 - expected).abs() < expected * 0.01);
            }
            step += 7;
        }
    }

    #[test]
    fn test_recovers_angle_at_half_turn() {
        for theta in [PI, -PI + 1e-3, PI - 1e-3] {
            let mut demod = converged_demodulator();
            let mut last_rising = None;
            let mut last_falling = None;

            for _ in 0..200 {
                let pair = resolver_pair(theta, demod.phase());
                let estimate = demod.update(pair).unwrap();
                match estimate.phase {
                    ExcitationPhase::Rising => last_rising = Some(estimate),
                    ExcitationPhase::Falling => last_falling = Some(estimate),
                }
            }

            for estimate in [last_rising.unwrap(), last_falling.unwrap()] {
                assert!(
                    estimate.angle > -PI && estimate.angle <= PI,
                    "theta={} phase={:?} angle={}",
                    theta,
                    estimate.phase,
                    estimate.angle
                );
                assert!(minus(estimate.angle, theta).abs() < 2e-3);
            }
        }
    }

    #[test]
    fn test_swapped_half_cycles_invert_angle() {
        let config = DemodulatorConfig {
            half_cycles: HalfCycleAssignment::Swapped,
            ..Default::default()
        };
        let mut demod = ResolverDemodulator::new(config);
        for _ in 0..100 {
            demod.update(baseline_pair());
        }
        demod.enable_excitation();

        let theta = deg(30.0);
        let mut last = None;
        for _ in 0..200 {
            let pair = resolver_pair(theta, demod.phase());
            last = demod.update(pair);
        }
        // Same wiring, opposite mapping: estimate is half a turn away
        let angle = last.unwrap().angle;
        assert!(minus(angle, wrap(theta + PI)).abs() < 2e-3);
    }

    #[test]
    fn test_lost_signal_amplitude_decays() {
        let mut demod = converged_demodulator();
        let theta = deg(45.0);
        for _ in 0..100 {
            let pair = resolver_pair(theta, demod.phase());
            demod.update(pair);
        }

        let mut last = None;
        for _ in 0..200 {
            last = demod.update(SamplePair::new(0, 0));
        }
        assert!(last.unwrap().amplitude < 1000);
    }
}
