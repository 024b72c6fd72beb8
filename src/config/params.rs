//! Drive parameters (default values)

/// Motor pole count (electrical turns per mechanical turn of the resolver angle)
pub const DEFAULT_POLE_COUNT: u8 = 4;

/// Resolver calibration offset [deg]
///
/// Smallest positive resolver angle observed with the stator field at zero.
/// Subtracted from the averaged resolver angle before pole scaling.
pub const DEFAULT_RESOLVER_OFFSET_DEG: f32 = 52.0;

/// Maximum sinusoid amplitude as a fraction of the half PWM range
pub const DEFAULT_PWM_SCALE: f32 = 0.9;

/// Minimum squared resolver amplitude for the drive gate to open
/// (raw ADC counts squared)
pub const DEFAULT_AMPLITUDE_THRESHOLD: u32 = 1_000_000;

/// Share of the previous center estimate kept on every update
pub const DEFAULT_CENTER_RETAIN: f32 = 0.95;

/// Lead/lag applied to the commutation angle [deg]
/// (+ while the gate is open, - while it is closed)
pub const FIELD_LEAD_DEG: f32 = 90.0;

/// Commutation tick rate [Hz]; the demodulator runs once per tick as well
pub const COMMUTATION_FREQUENCY_HZ: u32 = 20_000;

/// Time the excitation output is held low before ticks start [ms]
pub const EXCITATION_SETTLE_MS: u64 = 10;

/// Baseline (center) measurement time before excitation starts [ms]
pub const BASELINE_MS: u64 = 50;

/// Status report period [ms] (about 20 Hz)
pub const STATUS_PERIOD_MS: u64 = 50;
