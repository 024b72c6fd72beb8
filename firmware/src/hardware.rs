//! ハードウェア初期化モジュール
//!
//! クロック設定と、embassyのドライバを介さずに使う周辺機能
//! （TIM3転流タイマー、ADC変換完了割り込み、計測ピン）の初期化を集約します。

use embassy_stm32::{
    adc::{Adc, AnyAdcChannel, Instance},
    pac, Config,
};

use crate::config::{irq, tick};
use crate::fmt::*;

/// 計測ピン（PC4）：転流ティック開始でHigh、復調完了でLow
const PROBE_PIN: usize = 4;

/// RCCクロック設定を初期化
///
/// HSI → PLL（÷4 × 85 ÷ 2）で170MHz生成
pub fn create_clock_config() -> Config {
    let mut config = Config::default();
    {
        use embassy_stm32::rcc::mux::{Adcsel, ClockMux};
        use embassy_stm32::rcc::{Pll, PllMul, PllPreDiv, PllRDiv, PllSource, Sysclk};

        config.rcc.hsi = true;
        config.rcc.pll = Some(Pll {
            source: PllSource::HSI,
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL85,
            divp: None,
            divq: None,
            divr: Some(PllRDiv::DIV2),
        });
        config.rcc.sys = Sysclk::PLL1_R; // システムクロックをPLLに設定

        let mut clock_mux = ClockMux::default();
        clock_mux.adc12sel = Adcsel::SYS;
        config.rcc.mux = clock_mux;
    }
    config
}

/// ADCの変換シーケンスを1チャネルに設定
///
/// embassyのblocking_read()はSQR1（L=0, SQ1=チャネル）とサンプル時間を
/// 書き込んだまま残すため、1回読むだけで以降はADSTARTのみで同じチャネルを変換できる。
pub fn prime_adc_channel<T: Instance>(adc: &mut Adc<'static, T>, channel: &mut AnyAdcChannel<T>) {
    let raw = adc.blocking_read(channel);
    debug!("ADC channel primed, first reading: {}", raw);
}

/// ADC1/ADC2の変換完了割り込みを有効化
///
/// # Safety
/// PACを使用した直接レジスタ操作を含む
pub unsafe fn init_resolver_adc_interrupt() {
    for adc in [pac::ADC1, pac::ADC2] {
        // 残っているEOCフラグをクリア（1を書いてクリア）
        adc.isr().write(|w| w.set_eoc(true));
        adc.ier().modify(|w| w.set_eocie(true));
    }

    cortex_m::peripheral::NVIC::unmask(pac::Interrupt::ADC1_2);
    let mut cp = cortex_m::Peripherals::steal();
    cp.NVIC
        .set_priority(pac::Interrupt::ADC1_2, irq::RESOLVER_ADC_PRIORITY);

    info!("ADC1/ADC2 end-of-conversion interrupt enabled");
}

/// TIM3転流タイマーの初期化と開始（更新割り込み、COMMUTATION_FREQUENCY_HZ）
///
/// # Safety
/// PACを使用した直接レジスタ操作を含む
pub unsafe fn init_commutation_timer() {
    let rcc = pac::RCC;
    let tim3 = pac::TIM3;

    rcc.apb1enr1().modify(|w| w.set_tim3en(true));

    tim3.cr1().modify(|w| w.set_cen(false));
    tim3.psc().write_value(tick::PRESCALER);
    tim3.arr()
        .write_value(pac::timer::regs::ArrCore(tick::AUTO_RELOAD as u32));

    tim3.dier().modify(|w| w.set_uie(true));

    cortex_m::peripheral::NVIC::unmask(pac::Interrupt::TIM3);
    let mut cp = cortex_m::Peripherals::steal();
    cp.NVIC
        .set_priority(pac::Interrupt::TIM3, irq::COMMUTATION_TICK_PRIORITY);

    tim3.cnt().write_value(pac::timer::regs::CntCore(0));
    tim3.egr().write(|w| w.set_ug(true)); // プリスケーラ反映
    tim3.sr().write(|w| w.0 = 0); // UG由来のフラグをクリア

    tim3.cr1().modify(|w| {
        w.set_urs(pac::timer::vals::Urs::COUNTER_ONLY);
        w.set_cen(true);
    });

    info!(
        "TIM3 commutation tick started: PSC={}, ARR={}",
        tick::PRESCALER,
        tick::AUTO_RELOAD
    );
}

/// 2つのADC変換を同時に開始
#[inline(always)]
pub fn start_resolver_conversions() {
    pac::ADC1.cr().modify(|w| w.set_adstart(true));
    pac::ADC2.cr().modify(|w| w.set_adstart(true));
}

/// 計測ピンをHigh
#[inline(always)]
pub fn probe_high() {
    pac::GPIOC.bsrr().write(|w| w.set_bs(PROBE_PIN, true));
}

/// 計測ピンをLow
#[inline(always)]
pub fn probe_low() {
    pac::GPIOC.bsrr().write(|w| w.set_br(PROBE_PIN, true));
}
