//! TIM3ベースの転流ティック
//!
//! COMMUTATION_FREQUENCY_HZ（20kHz）の更新割り込みごとに
//! 1. RESOLVER_STATEから最新の角度・振幅を取得
//! 2. 転流角とDuty比を計算し、TIM1の3相PWMへ書き込み
//! 3. 計測ピンをHighにして、次のADC変換（正弦/余弦チャネル）を開始
//!
//! ADC割り込みの方が優先度が高いため、復調は次のティックまでに完了する。

use core::cell::RefCell;
use core::sync::atomic::Ordering;

use embassy_stm32::pac;
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};
use resolver_drive::CommutationDriver;

use crate::config::COMMUTATION_FREQUENCY_HZ;
use crate::fmt::*;
use crate::hardware;
use crate::motor_driver::MotorDriver;
use crate::state::{DRIVE_TELEMETRY, PWM_ENABLE, RESOLVER_STATE};

/// 転流割り込みが所有するオブジェクト
pub struct CommutationContext {
    pub driver: CommutationDriver,
    pub motor: MotorDriver,
    /// ログ間引き用カウンタ
    log_counter: u32,
}

impl CommutationContext {
    pub fn new(driver: CommutationDriver, motor: MotorDriver) -> Self {
        Self {
            driver,
            motor,
            log_counter: 0,
        }
    }
}

static COMMUTATION_CONTEXT: Mutex<CriticalSectionRawMutex, RefCell<Option<CommutationContext>>> =
    Mutex::new(RefCell::new(None));

/// 割り込み開始前に転流コンテキストを登録
pub fn install(context: CommutationContext) {
    COMMUTATION_CONTEXT.lock(|cell| {
        cell.replace(Some(context));
    });
}

/// TIM3割り込みハンドラー（Update）
#[inline(always)]
fn commutation_irq_handler() {
    let tim3 = pac::TIM3;
    if !tim3.sr().read().uif() {
        return;
    }
    tim3.sr().modify(|w| w.set_uif(false)); // フラグクリア

    let snapshot = RESOLVER_STATE.snapshot();

    // ロックはコンテキストの取り出し/返却だけに使い、計算中はADC割り込みを許可する
    if let Some(mut ctx) = COMMUTATION_CONTEXT.lock(|cell| cell.take()) {
        // PWM出力の有効化（起動シーケンス完了後）
        let pwm_enable = PWM_ENABLE.load(Ordering::Relaxed);
        if pwm_enable != ctx.motor.is_enabled() {
            if pwm_enable {
                ctx.motor.enable_all_channels();
            } else {
                ctx.motor.disable_all_channels();
            }
        }

        let output = ctx.driver.update(&snapshot);
        ctx.motor.set_duties(&output.duties);
        DRIVE_TELEMETRY.publish(&output);

        // デバッグログ（1秒ごと）
        ctx.log_counter += 1;
        if ctx.log_counter >= COMMUTATION_FREQUENCY_HZ {
            ctx.log_counter = 0;
            trace!(
                "[Tick] angle={}rad scale={} duty U/V/W={}/{}/{}",
                output.angle,
                output.duty_scale,
                output.duties.u,
                output.duties.v,
                output.duties.w
            );
        }

        COMMUTATION_CONTEXT.lock(|cell| {
            cell.replace(Some(ctx));
        });
    }

    hardware::probe_high();
    hardware::start_resolver_conversions();
}

/// TIM3割り込みのRust側エントリーポイント
#[allow(non_snake_case)]
#[no_mangle]
pub unsafe extern "C" fn TIM3() {
    commutation_irq_handler();
}
