//! Single-context control loop
//!
//! Owns one demodulator, one commutation driver and the state they share.
//! Used where both routines run in the same execution context (host
//! simulation, bench tests). The firmware runs the same pieces from two
//! interrupt handlers around `static` `ResolverState`/`DriveTelemetry`.

use crate::commutation::{CommutationDriver, CommutationOutput};
use crate::config::DriveConfig;
use crate::conversion::SamplePair;
use crate::demodulator::{ExcitationPhase, HalfCycleEstimate, ResolverDemodulator};
use crate::state::{DriveTelemetry, ResolverSnapshot, ResolverState};
use crate::status::StatusReport;

pub struct ControlLoop {
    demodulator: ResolverDemodulator,
    driver: CommutationDriver,
    resolver: ResolverState,
    telemetry: DriveTelemetry,
}

impl ControlLoop {
    pub fn new(config: DriveConfig) -> Self {
        Self {
            demodulator: ResolverDemodulator::new(config.demodulator),
            driver: CommutationDriver::new(config.commutation),
            resolver: ResolverState::new(),
            telemetry: DriveTelemetry::new(),
        }
    }

    /// Demodulator step: one completed conversion
    pub fn on_conversion(&mut self, pair: SamplePair) -> Option<HalfCycleEstimate> {
        let estimate = self.demodulator.update(pair)?;
        self.resolver.publish(&estimate);
        Some(estimate)
    }

    /// Commutation step: one timer tick
    pub fn on_tick(&mut self) -> CommutationOutput {
        let output = self.driver.update(&self.resolver.snapshot());
        self.telemetry.publish(&output);
        output
    }

    /// End of the baseline measurement
    pub fn enable_excitation(&mut self) {
        self.demodulator.enable_excitation();
    }

    /// Half-cycle the next conversion belongs to
    pub fn excitation_phase(&self) -> ExcitationPhase {
        self.demodulator.phase()
    }

    pub fn snapshot(&self) -> ResolverSnapshot {
        self.resolver.snapshot()
    }

    pub fn status(&self) -> StatusReport {
        StatusReport::new(&self.resolver.snapshot(), &self.telemetry)
    }

    pub fn driver(&self) -> &CommutationDriver {
        &self.driver
    }
}

impl Default for ControlLoop {
    fn default() -> Self {
        Self::new(DriveConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_keeps_gate_closed() {
        let mut control = ControlLoop::default();
        for _ in 0..50 {
            assert_eq!(control.on_conversion(SamplePair::new(2048, 2048)), None);
            let output = control.on_tick();
            assert_eq!(output.duty_scale, 0.0);
        }
        assert_eq!(control.snapshot(), ResolverSnapshot::default());
        assert!(!control.status().is_driving());
    }
}
