//! Firmware configuration
//!
//! Control parameters come from the `resolver_drive` crate; this module adds
//! the board and peripheral settings.

pub use resolver_drive::config::*;

/// System clock [Hz] (HSI → PLL, see `hardware::create_clock_config`)
pub const SYSTEM_CLOCK_HZ: u32 = 170_000_000;

/// PWM settings (TIM1, three complementary channels)
pub mod pwm {
    use embassy_stm32::time::Hertz;

    /// PWM frequency (default value)
    pub const DEFAULT_FREQUENCY: Hertz = Hertz(20_000);

    /// Dead time (default value)
    pub const DEFAULT_DEAD_TIME: u16 = 1;
}

/// Commutation tick timer (TIM3)
pub mod tick {
    use super::{COMMUTATION_FREQUENCY_HZ, SYSTEM_CLOCK_HZ};

    /// Prescaler: full speed
    pub const PRESCALER: u16 = 0;

    /// Auto-reload for `COMMUTATION_FREQUENCY_HZ` at `SYSTEM_CLOCK_HZ`
    pub const AUTO_RELOAD: u16 =
        (SYSTEM_CLOCK_HZ / (PRESCALER as u32 + 1) / COMMUTATION_FREQUENCY_HZ - 1) as u16;
}

/// NVIC priorities (upper 4 bits used on STM32G4; lower value = higher priority)
pub mod irq {
    /// Resolver ADC end-of-conversion; must preempt the commutation tick
    pub const RESOLVER_ADC_PRIORITY: u8 = 0x10;

    /// Commutation tick
    pub const COMMUTATION_TICK_PRIORITY: u8 = 0x20;
}
