//! Drive configuration
//!
//! Compile-time defaults live in `params`; `DriveConfig` carries the values the
//! demodulator and the commutation driver actually run with.

pub mod params;

pub use params::*;

use core::fmt;

use crate::angle::deg;

/// Which excitation polarity is treated as the "rising" half-cycle
///
/// Depends on how the resolver is wired; swapping it flips the sign of both
/// channel deltas on each half-cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalfCycleAssignment {
    /// Excitation high: `sample - center`, excitation low: `center - sample`
    #[default]
    Normal,
    /// Excitation high: `center - sample`, excitation low: `sample - center`
    Swapped,
}

/// Demodulator settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DemodulatorConfig {
    /// Share of the old center kept per update (0.0-1.0, exclusive of 1.0)
    pub center_retain: f32,
    /// Polarity to half-cycle mapping
    pub half_cycles: HalfCycleAssignment,
}

impl Default for DemodulatorConfig {
    fn default() -> Self {
        Self {
            center_retain: DEFAULT_CENTER_RETAIN,
            half_cycles: HalfCycleAssignment::Normal,
        }
    }
}

/// Commutation driver settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommutationConfig {
    /// Motor pole count
    pub pole_count: u8,
    /// Resolver calibration offset [rad]
    pub resolver_offset: f32,
    /// Maximum duty amplitude (0.0-1.0]
    pub pwm_scale: f32,
    /// Gate threshold on both squared amplitudes
    pub amplitude_threshold: u32,
    /// Field lead while driving, lag while idle [rad]
    pub field_lead: f32,
}

impl Default for CommutationConfig {
    fn default() -> Self {
        Self {
            pole_count: DEFAULT_POLE_COUNT,
            resolver_offset: deg(DEFAULT_RESOLVER_OFFSET_DEG),
            pwm_scale: DEFAULT_PWM_SCALE,
            amplitude_threshold: DEFAULT_AMPLITUDE_THRESHOLD,
            field_lead: deg(FIELD_LEAD_DEG),
        }
    }
}

/// Complete drive configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriveConfig {
    pub demodulator: DemodulatorConfig,
    pub commutation: CommutationConfig,
}

/// Rejected configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pole count of zero
    ZeroPoleCount,
    /// `pwm_scale` outside (0.0, 1.0] or not finite
    PwmScaleOutOfRange,
    /// `center_retain` outside [0.0, 1.0) or not finite
    CenterRetainOutOfRange,
    /// Resolver offset or field lead not finite
    NonFiniteAngle,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroPoleCount => f.write_str("pole count must be at least 1"),
            ConfigError::PwmScaleOutOfRange => f.write_str("pwm scale must be in (0, 1]"),
            ConfigError::CenterRetainOutOfRange => {
                f.write_str("center retain factor must be in [0, 1)")
            }
            ConfigError::NonFiniteAngle => f.write_str("angles must be finite"),
        }
    }
}

impl DriveConfig {
    /// Check every value the control loop depends on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.commutation;
        if c.pole_count == 0 {
            return Err(ConfigError::ZeroPoleCount);
        }
        if !(c.pwm_scale > 0.0 && c.pwm_scale <= 1.0) {
            return Err(ConfigError::PwmScaleOutOfRange);
        }
        if !c.resolver_offset.is_finite() || !c.field_lead.is_finite() {
            return Err(ConfigError::NonFiniteAngle);
        }

        let retain = self.demodulator.center_retain;
        if !(0.0..1.0).contains(&retain) {
            return Err(ConfigError::CenterRetainOutOfRange);
        }
        Ok(())
    }
}
