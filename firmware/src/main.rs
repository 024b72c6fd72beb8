#![no_std]
#![no_main]

// ログマクロを他のモジュールより先に定義する
mod fmt;

mod benchmark;
mod commutation_tim;
mod config;
mod hardware;
mod motor_driver;
mod resolver_adc;
mod state;
mod tasks;

#[cfg(not(feature = "defmt"))]
use panic_halt as _;
#[cfg(feature = "defmt")]
use {defmt_rtt as _, panic_probe as _};

use core::sync::atomic::Ordering;

use embassy_executor::Spawner;
use embassy_stm32::{
    adc::{Adc, AdcChannel, AnyAdcChannel, SampleTime},
    gpio::{Level, Output, Speed},
    peripherals,
    timer::{
        complementary_pwm::{ComplementaryPwm, ComplementaryPwmPin},
        low_level::CountingMode,
        simple_pwm::PwmPin,
    },
};
use embassy_time::{Duration, Timer};
use resolver_drive::{CommutationDriver, DriveConfig, ResolverDemodulator};

use commutation_tim::CommutationContext;
use fmt::*;
use motor_driver::MotorDriver;
use resolver_adc::ResolverContext;
use tasks::status_task;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // ハードウェア初期化
    let config = hardware::create_clock_config();
    let p = embassy_stm32::init(config);

    info!("═══════════════════════════════════════════════════════════════════");
    info!("");
    info!("        Resolver Sinusoidal Drive • STM32G431VB @ 170MHz");
    info!("");
    info!("═══════════════════════════════════════════════════════════════════");

    // 制御パラメータ
    let drive_config = DriveConfig::default();
    unwrap!(drive_config.validate());
    info!(
        "  Poles: {}, offset: {} rad, PWM scale: {}",
        drive_config.commutation.pole_count,
        drive_config.commutation.resolver_offset,
        drive_config.commutation.pwm_scale
    );
    info!(
        "  Amplitude threshold: {}, center retain: {}",
        drive_config.commutation.amplitude_threshold,
        drive_config.demodulator.center_retain
    );

    // レゾルバ励磁出力（PC2）：ベースライン測定が終わるまでLow
    let excitation = Output::new(p.PC2, Level::Low, Speed::VeryHigh);
    // 計測ピン（PC4）：以降はhardware::probe_high/lowでレジスタ直接操作
    let _probe = Output::new(p.PC4, Level::Low, Speed::VeryHigh);
    // ゲートドライバ有効化ピン（PD14）
    let mut gate_enable = Output::new(p.PD14, Level::Low, Speed::Low);

    // PWM初期化（TIM1、3相補完PWM）
    let mut uvw_pwm = ComplementaryPwm::new(
        p.TIM1,
        Some(PwmPin::new(
            p.PE9,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(ComplementaryPwmPin::new(
            p.PE8,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(PwmPin::new(
            p.PE11,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(ComplementaryPwmPin::new(
            p.PE10,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(PwmPin::new(
            p.PE13,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        Some(ComplementaryPwmPin::new(
            p.PE12,
            embassy_stm32::gpio::OutputType::PushPull,
        )),
        None,
        None,
        config::pwm::DEFAULT_FREQUENCY,
        CountingMode::EdgeAlignedUp,
    );
    uvw_pwm.set_dead_time(config::pwm::DEFAULT_DEAD_TIME);
    // 出力は起動シーケンス完了後に転流割り込みが有効化する
    let motor = MotorDriver::new(uvw_pwm);
    info!("PWM initialized: max duty {}", motor.max_duty());

    // ADC初期化（ADC1=正弦チャネルA: PA0、ADC2=余弦チャネルB: PA4）
    let mut adc1 = Adc::new(p.ADC1);
    adc1.set_sample_time(SampleTime::CYCLES24_5);
    let mut adc2 = Adc::new(p.ADC2);
    adc2.set_sample_time(SampleTime::CYCLES24_5);

    let mut sine_channel: AnyAdcChannel<peripherals::ADC1> = p.PA0.degrade_adc();
    let mut cosine_channel: AnyAdcChannel<peripherals::ADC2> = p.PA4.degrade_adc();
    hardware::prime_adc_channel(&mut adc1, &mut sine_channel);
    hardware::prime_adc_channel(&mut adc2, &mut cosine_channel);
    info!("Resolver ADC ready: PA0 (ADC1), PA4 (ADC2)");

    // ベンチマーク実行
    unsafe {
        benchmark::enable_cycle_counter();
    }
    benchmark::run_phase_sines_benchmark(1000);

    // 励磁Lowの状態で信号を安定させる
    Timer::after(Duration::from_millis(config::EXCITATION_SETTLE_MS)).await;

    resolver_adc::install(ResolverContext::new(
        ResolverDemodulator::new(drive_config.demodulator),
        excitation,
    ));
    commutation_tim::install(CommutationContext::new(
        CommutationDriver::new(drive_config.commutation),
        motor,
    ));

    // ADC割り込み → TIM3転流タイマーの順に開始
    unsafe {
        hardware::init_resolver_adc_interrupt();
        hardware::init_commutation_timer();
    }

    // ベースライン測定（励磁なしでセンター値を収束させる）
    info!("Measuring resolver baseline ({}ms)...", config::BASELINE_MS);
    Timer::after(Duration::from_millis(config::BASELINE_MS)).await;

    state::EXCITATION_ENABLE.store(true, Ordering::Relaxed);
    state::PWM_ENABLE.store(true, Ordering::Relaxed);
    gate_enable.set_high();
    info!("Starting sinusoidal commutation...");

    spawner.spawn(unwrap!(status_task()));

    // メインループ（ADCとピンの所有権を保持）
    loop {
        Timer::after(Duration::from_millis(100)).await;
    }
}
