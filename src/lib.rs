//! Resolver-fed sinusoidal commutation
//!
//! Demodulates a two-channel (sine/cosine) resolver into rotor angle and signal
//! strength, and turns the pole-scaled angle into three PWM duty cycles 120°
//! apart. Hardware-register-agnostic; the firmware crate wires it to timers,
//! ADCs and GPIO.
#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod angle;
pub mod commutation;
pub mod config;
pub mod control_loop;
pub mod conversion;
pub mod demodulator;
pub mod state;
pub mod status;

// Re-export main types for easier access
pub use commutation::{CommutationDriver, CommutationOutput, PhaseDuties};
pub use config::{ConfigError, DriveConfig};
pub use control_loop::ControlLoop;
pub use conversion::{ConversionLatch, ResolverChannel, SamplePair};
pub use demodulator::{ExcitationPhase, HalfCycleEstimate, ResolverDemodulator};
pub use state::{DriveTelemetry, ResolverSnapshot, ResolverState};
pub use status::StatusReport;
