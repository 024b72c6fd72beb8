//! ステータス表示タスク
//!
//! 約20Hzでレゾルバの2つの半周期の角度・振幅と、その差を表示します。

use embassy_time::{Duration, Ticker};
use resolver_drive::StatusReport;

use crate::config::{COMMUTATION_FREQUENCY_HZ, STATUS_PERIOD_MS};
use crate::fmt::*;
use crate::state::{DRIVE_TELEMETRY, RESOLVER_STATE};

/// 1秒あたりのステータス表示回数
const REPORTS_PER_SECOND: u32 = 1000 / STATUS_PERIOD_MS as u32;

/// ステータス表示タスク - 角度と振幅を周期的にログ出力
#[embassy_executor::task]
pub async fn status_task() {
    info!("Status task started ({}ms period)", STATUS_PERIOD_MS);

    let mut ticker = Ticker::every(Duration::from_millis(STATUS_PERIOD_MS));

    // 転流ティック数の監視用（1秒ごと）
    let mut log_counter = 0u32;
    let mut last_ticks = DRIVE_TELEMETRY.ticks();
    let mut was_driving = false;

    loop {
        ticker.next().await;

        let report = StatusReport::new(&RESOLVER_STATE.snapshot(), &DRIVE_TELEMETRY);

        // 角度 [deg]
        info!(
            "{} {} diff: {}",
            report.angle_rising_deg, report.angle_falling_deg, report.angle_diff_deg
        );
        // 振幅
        info!(
            "{} {} diff: {}",
            report.amplitude_rising, report.amplitude_falling, report.amplitude_diff
        );

        if report.is_driving() != was_driving {
            was_driving = report.is_driving();
            info!(
                "[Status] drive {} (commutation {}°)",
                if was_driving { "ON" } else { "IDLE" },
                report.commutation_deg
            );
        }

        // 転流ティック周波数の確認（1秒ごと）
        log_counter += 1;
        if log_counter >= REPORTS_PER_SECOND {
            log_counter = 0;
            let ticks = DRIVE_TELEMETRY.ticks();
            let rate = ticks.wrapping_sub(last_ticks);
            last_ticks = ticks;

            if rate + rate / 100 < COMMUTATION_FREQUENCY_HZ {
                warn!(
                    "[Status] commutation tick slow: {}Hz (expected {}Hz)",
                    rate, COMMUTATION_FREQUENCY_HZ
                );
            } else {
                debug!("[Status] commutation tick: {}Hz", rate);
            }
        }
    }
}
