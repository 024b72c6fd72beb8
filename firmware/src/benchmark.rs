//! ベンチマークモジュール
//!
//! 転流ティック内で毎回呼ばれる3相正弦波生成の処理時間を測定します。

use core::sync::atomic::{compiler_fence, Ordering};

use cortex_m::peripheral::DWT;
use resolver_drive::commutation::{phase_sines_with, SineSource};

use crate::config::{COMMUTATION_FREQUENCY_HZ, SYSTEM_CLOCK_HZ};
use crate::fmt::*;

/// テスト角度 [rad]（約100°）
const TEST_ANGLE: f32 = 1.75;

/// DWTサイクルカウンタを有効化
///
/// # Safety
/// Cortex-Mペリフェラルへの直接アクセスを含む
pub unsafe fn enable_cycle_counter() {
    let mut cp = cortex_m::Peripherals::steal();
    cp.DCB.enable_trace();
    cp.DWT.enable_cycle_counter();
}

/// 指定した実装でphase_sines_with()をiterations回実行
///
/// # 戻り値
/// (最後の計算結果, 合計サイクル数)
fn measure(source: SineSource, iterations: u32) -> ((f32, f32, f32), u32) {
    let start = DWT::cycle_count();
    let mut result = (0.0, 0.0, 0.0);
    for _ in 0..iterations {
        result = phase_sines_with(source, TEST_ANGLE);
        // 最適化防止
        compiler_fence(Ordering::SeqCst);
    }
    let end = DWT::cycle_count();
    (result, end.wrapping_sub(start))
}

/// phase_sines_with()のベンチマークを実行して結果を表示
///
/// # 引数
/// * `iterations` - ベンチマーク実行回数
pub fn run_phase_sines_benchmark(iterations: u32) {
    info!("Running phase_sines() benchmark...");

    let (result_idsp, ticks_idsp) = measure(SineSource::Idsp, iterations);
    let (result_libm, ticks_libm) = measure(SineSource::Libm, iterations);

    // サイクル/呼び出し を計算（整数に変換してdefmtで表示）
    let cycles_per_call_idsp = (ticks_idsp / iterations).max(1);
    let cycles_per_call_libm = ticks_libm / iterations;
    let speedup_x10 = (cycles_per_call_libm * 10) / cycles_per_call_idsp; // 10倍してdefmtで表示

    // 1ティックあたりのサイクル予算
    let budget = SYSTEM_CLOCK_HZ / COMMUTATION_FREQUENCY_HZ;

    info!("Benchmark results ({} iterations):", iterations);
    info!(
        "  idsp::cossin():  {} cycles total, {} cycles/call",
        ticks_idsp, cycles_per_call_idsp
    );
    info!(
        "  libm::cosf/sinf: {} cycles total, {} cycles/call",
        ticks_libm, cycles_per_call_libm
    );
    info!(
        "  Speedup: {}.{}x faster with idsp",
        speedup_x10 / 10,
        speedup_x10 % 10
    );
    info!("  Tick budget: {} cycles", budget);
    info!(
        "  Result idsp:  u={}, v={}, w={}",
        result_idsp.0, result_idsp.1, result_idsp.2
    );
    info!(
        "  Result libm:  u={}, v={}, w={}",
        result_libm.0, result_libm.1, result_libm.2
    );
    info!(
        "  Error: u={}, v={}, w={}",
        result_idsp.0 - result_libm.0,
        result_idsp.1 - result_libm.1,
        result_idsp.2 - result_libm.2
    );
}
