//! レゾルバADC変換完了割り込み
//!
//! ADC1（正弦チャネルA）とADC2（余弦チャネルB）は共通のADC1_2割り込みを持つ。
//! 各ADCのEOCを個別に受け取り、ConversionLatchで両チャネルが揃ったときだけ
//! 復調を実行する（割り込み内でのビジーウェイトは行わない）。

use core::cell::RefCell;
use core::sync::atomic::Ordering;

use embassy_stm32::{gpio::Output, pac};
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use resolver_drive::{ConversionLatch, ResolverDemodulator};

use crate::fmt::*;
use crate::hardware;
use crate::state::{EXCITATION_ENABLE, RESOLVER_STATE};

/// ADC割り込みが所有するオブジェクト
pub struct ResolverContext {
    pub demodulator: ResolverDemodulator,
    pub latch: ConversionLatch,
    /// レゾルバ励磁出力
    pub excitation: Output<'static>,
}

impl ResolverContext {
    pub fn new(demodulator: ResolverDemodulator, excitation: Output<'static>) -> Self {
        Self {
            demodulator,
            latch: ConversionLatch::new(),
            excitation,
        }
    }
}

static RESOLVER_CONTEXT: Mutex<CriticalSectionRawMutex, RefCell<Option<ResolverContext>>> =
    Mutex::new(RefCell::new(None));

/// 割り込み有効化前に復調コンテキストを登録
pub fn install(context: ResolverContext) {
    RESOLVER_CONTEXT.lock(|cell| {
        cell.replace(Some(context));
    });
}

/// 変換完了したADCの結果を読み出す（DR読み出しでEOCもクリアされる）
#[inline(always)]
fn take_result(adc: pac::adc::Adc) -> Option<u16> {
    if adc.isr().read().eoc() {
        Some(adc.dr().read().rdata())
    } else {
        None
    }
}

/// ADC1_2割り込みハンドラー
#[inline(always)]
fn resolver_irq_handler() {
    let sine = take_result(pac::ADC1);
    let cosine = take_result(pac::ADC2);

    // 割り込み禁止区間はコンテキストの取り出し/返却のみ
    let Some(mut ctx) = RESOLVER_CONTEXT.lock(|cell| cell.take()) else {
        return;
    };

    if let Some(pair) = ctx.latch.complete_any(sine, cosine) {
        if !ctx.demodulator.is_excitation_enabled() && EXCITATION_ENABLE.load(Ordering::Relaxed) {
            ctx.demodulator.enable_excitation();
            info!("Resolver excitation enabled");
        }

        if let Some(estimate) = ctx.demodulator.update(pair) {
            if estimate.phase.excitation_high() {
                ctx.excitation.set_high();
            } else {
                ctx.excitation.set_low();
            }
            RESOLVER_STATE.publish(&estimate);
        }

        hardware::probe_low();
    }

    RESOLVER_CONTEXT.lock(|cell| {
        cell.replace(Some(ctx));
    });
}

/// ADC1_2割り込みのRust側エントリーポイント
#[allow(non_snake_case)]
#[no_mangle]
pub unsafe extern "C" fn ADC1_2() {
    resolver_irq_handler();
}
