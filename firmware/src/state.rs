//! Global shared state
//!
//! Interrupt handlers and tasks exchange values through lock-free cells only.

use core::sync::atomic::AtomicBool;

use resolver_drive::{DriveTelemetry, ResolverState};

/// Latest half-cycle estimates (written by the ADC interrupt, read by the tick)
pub static RESOLVER_STATE: ResolverState = ResolverState::new();

/// Latest commutation outputs (written by the tick, read by the status task)
pub static DRIVE_TELEMETRY: DriveTelemetry = DriveTelemetry::new();

/// Excitation running; until set, the demodulator only tracks the centers
pub static EXCITATION_ENABLE: AtomicBool = AtomicBool::new(false);

/// PWM outputs enabled
pub static PWM_ENABLE: AtomicBool = AtomicBool::new(false);
