//! Human-readable drive status
//!
//! Diagnostic snapshot printed by the background loop (about 20 Hz): both raw
//! half-cycle angles in degrees with their difference, both amplitudes with
//! their difference, and the drive gate.

use core::fmt;

use crate::angle::{minus, rad};
use crate::state::{DriveTelemetry, ResolverSnapshot};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    /// Rising half-cycle angle [deg]
    pub angle_rising_deg: f32,
    /// Falling half-cycle angle [deg]
    pub angle_falling_deg: f32,
    /// Shortest-arc rising − falling [deg]
    pub angle_diff_deg: f32,
    pub amplitude_rising: u32,
    pub amplitude_falling: u32,
    /// rising − falling
    pub amplitude_diff: i64,
    /// Commutation angle of the last tick [deg]
    pub commutation_deg: f32,
    /// Drive gate of the last tick
    pub duty_scale: f32,
}

impl StatusReport {
    pub fn new(snapshot: &ResolverSnapshot, telemetry: &DriveTelemetry) -> Self {
        Self {
            angle_rising_deg: rad(snapshot.angle_rising),
            angle_falling_deg: rad(snapshot.angle_falling),
            angle_diff_deg: rad(minus(snapshot.angle_rising, snapshot.angle_falling)),
            amplitude_rising: snapshot.amplitude_rising,
            amplitude_falling: snapshot.amplitude_falling,
            amplitude_diff: snapshot.amplitude_rising as i64 - snapshot.amplitude_falling as i64,
            commutation_deg: rad(telemetry.commutation_angle()),
            duty_scale: telemetry.duty_scale(),
        }
    }

    /// Drive gate open on the last tick
    pub fn is_driving(&self) -> bool {
        self.duty_scale > 0.0
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} {:.2} diff: {:.2} | {} {} diff: {} | commutation {:.1} scale {:.0}",
            self.angle_rising_deg,
            self.angle_falling_deg,
            self.angle_diff_deg,
            self.amplitude_rising,
            self.amplitude_falling,
            self.amplitude_diff,
            self.commutation_deg,
            self.duty_scale
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::deg;
    use crate::commutation::{CommutationOutput, PhaseDuties};

    #[test]
    fn test_report_values() {
        let snapshot = ResolverSnapshot {
            angle_rising: deg(179.0),
            angle_falling: deg(-179.0),
            amplitude_rising: 100,
            amplitude_falling: 300,
        };
        let telemetry = DriveTelemetry::new();
        telemetry.publish(&CommutationOutput {
            angle: deg(45.0),
            duty_scale: 1.0,
            duties: PhaseDuties::IDLE,
        });

        let report = StatusReport::new(&snapshot, &telemetry);
        assert!((report.angle_rising_deg - 179.0).abs() < 1e-3);
        assert!((report.angle_diff_deg + 2.0).abs() < 1e-3);
        assert_eq!(report.amplitude_diff, -200);
        assert!((report.commutation_deg - 45.0).abs() < 1e-3);
        assert!(report.is_driving());
    }

    #[test]
    fn test_display() {
        let snapshot = ResolverSnapshot {
            angle_rising: deg(30.0),
            angle_falling: deg(30.0),
            amplitude_rising: 2_250_000,
            amplitude_falling: 2_240_000,
        };
        let report = StatusReport::new(&snapshot, &DriveTelemetry::new());
        let text = format!("{}", report);
        assert!(text.starts_with("30.00 30.00 diff: 0.00 | 2250000 2240000 diff: 10000"));
        assert!(text.ends_with("scale 0"));
        assert!(!report.is_driving());
    }
}
