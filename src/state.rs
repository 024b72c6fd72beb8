//! Shared state between the demodulator and the commutation driver
//!
//! One producer (demodulator interrupt) and one consumer (commutation tick)
//! exchange scalars through individual atomic cells. Each value is read and
//! written as a whole word; the consumer may see a value up to one sample
//! period old but never a torn one. `f32` values are stored as their bit
//! pattern.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::commutation::CommutationOutput;
use crate::demodulator::{ExcitationPhase, HalfCycleEstimate};

/// Single-writer cell for an `f32`
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    /// Bit pattern 0 is +0.0
    const fn zero() -> Self {
        Self(AtomicU32::new(0))
    }

    #[inline(always)]
    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    #[inline(always)]
    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

/// Latest angle and amplitude estimates, one pair per excitation half-cycle
#[derive(Debug)]
pub struct ResolverState {
    angle_rising: AtomicF32,
    angle_falling: AtomicF32,
    amplitude_rising: AtomicU32,
    amplitude_falling: AtomicU32,
}

/// Copy of `ResolverState` taken at one instant
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResolverSnapshot {
    /// Angle from the rising half-cycle [rad]
    pub angle_rising: f32,
    /// Angle from the falling half-cycle [rad]
    pub angle_falling: f32,
    /// Squared amplitude from the rising half-cycle
    pub amplitude_rising: u32,
    /// Squared amplitude from the falling half-cycle
    pub amplitude_falling: u32,
}

impl ResolverState {
    /// Zero angles and zero amplitudes (drive gate closed)
    pub const fn new() -> Self {
        Self {
            angle_rising: AtomicF32::zero(),
            angle_falling: AtomicF32::zero(),
            amplitude_rising: AtomicU32::new(0),
            amplitude_falling: AtomicU32::new(0),
        }
    }

    /// Store a half-cycle estimate into its slot
    ///
    /// Must only be called from the single producer context.
    pub fn publish(&self, estimate: &HalfCycleEstimate) {
        let (angle, amplitude) = match estimate.phase {
            ExcitationPhase::Rising => (&self.angle_rising, &self.amplitude_rising),
            ExcitationPhase::Falling => (&self.angle_falling, &self.amplitude_falling),
        };
        angle.store(estimate.angle);
        amplitude.store(estimate.amplitude, Ordering::Release);
    }

    /// Read every value once
    pub fn snapshot(&self) -> ResolverSnapshot {
        ResolverSnapshot {
            angle_rising: self.angle_rising.load(),
            angle_falling: self.angle_falling.load(),
            amplitude_rising: self.amplitude_rising.load(Ordering::Acquire),
            amplitude_falling: self.amplitude_falling.load(Ordering::Acquire),
        }
    }
}

impl Default for ResolverState {
    fn default() -> Self {
        Self::new()
    }
}

/// Latest commutation driver outputs (for status reporting)
#[derive(Debug)]
pub struct DriveTelemetry {
    commutation_angle: AtomicF32,
    duty_scale: AtomicF32,
    /// Published ticks (wrapping)
    ticks: AtomicU32,
}

impl DriveTelemetry {
    pub const fn new() -> Self {
        Self {
            commutation_angle: AtomicF32::zero(),
            duty_scale: AtomicF32::zero(),
            ticks: AtomicU32::new(0),
        }
    }

    pub fn publish(&self, output: &CommutationOutput) {
        self.commutation_angle.store(output.angle);
        self.duty_scale.store(output.duty_scale);
        // Single writer: load + store is enough
        let ticks = self.ticks.load(Ordering::Relaxed);
        self.ticks.store(ticks.wrapping_add(1), Ordering::Relaxed);
    }

    /// Commutation angle of the last tick [rad]
    pub fn commutation_angle(&self) -> f32 {
        self.commutation_angle.load()
    }

    /// Duty gate of the last tick (0.0 or 1.0)
    pub fn duty_scale(&self) -> f32 {
        self.duty_scale.load()
    }

    /// Wrapping count of published ticks
    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl Default for DriveTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot_is_zero() {
        let state = ResolverState::new();
        assert_eq!(state.snapshot(), ResolverSnapshot::default());
    }

    #[test]
    fn test_publish_fills_matching_slot() {
        let state = ResolverState::new();
        state.publish(&HalfCycleEstimate {
            phase: ExcitationPhase::Rising,
            angle: 0.5,
            amplitude: 1234,
        });
        state.publish(&HalfCycleEstimate {
            phase: ExcitationPhase::Falling,
            angle: -2.5,
            amplitude: 99,
        });

        let snapshot = state.snapshot();
        assert_eq!(snapshot.angle_rising, 0.5);
        assert_eq!(snapshot.amplitude_rising, 1234);
        assert_eq!(snapshot.angle_falling, -2.5);
        assert_eq!(snapshot.amplitude_falling, 99);
    }

    #[test]
    fn test_telemetry() {
        let telemetry = DriveTelemetry::new();
        assert_eq!(telemetry.duty_scale(), 0.0);
        telemetry.publish(&CommutationOutput {
            angle: 1.0,
            duty_scale: 1.0,
            duties: Default::default(),
        });
        assert_eq!(telemetry.commutation_angle(), 1.0);
        assert_eq!(telemetry.duty_scale(), 1.0);
        assert_eq!(telemetry.ticks(), 1);
    }
}
