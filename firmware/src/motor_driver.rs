//! モータードライバー抽象化レイヤー
//!
//! PWMハードウェアへの直接アクセスを隠蔽し、
//! 正弦波転流に必要な高レベルインターフェースを提供します。

use embassy_stm32::{
    peripherals,
    timer::{complementary_pwm::ComplementaryPwm, Channel},
};
use resolver_drive::PhaseDuties;

/// 3相モータードライバー
///
/// STM32のComplementaryPwmを使用して3相ブラシレスモーターを駆動します。
pub struct MotorDriver {
    pwm: ComplementaryPwm<'static, peripherals::TIM1>,
    max_duty: u16,
    enabled: bool,
}

impl MotorDriver {
    /// 新しいモータードライバーを作成（全チャネル無効、Duty 50%）
    ///
    /// # 引数
    /// * `pwm` - PWMペリフェラル（TIM1）
    pub fn new(pwm: ComplementaryPwm<'static, peripherals::TIM1>) -> Self {
        let max_duty = pwm.get_max_duty();
        let mut driver = Self {
            pwm,
            max_duty,
            enabled: false,
        };
        driver.disable_all_channels();
        driver.set_duties(&PhaseDuties::IDLE);
        driver
    }

    /// PWMの最大Duty値を取得
    pub fn max_duty(&self) -> u16 {
        self.max_duty
    }

    /// 3相全てのDuty比を設定
    ///
    /// # 引数
    /// * `duties` - 各相のDuty比（0.0～1.0）
    #[inline]
    pub fn set_duties(&mut self, duties: &PhaseDuties) {
        let (duty_u, duty_v, duty_w) = duties.to_compare(self.max_duty);
        self.pwm.set_duty(Channel::Ch1, duty_u);
        self.pwm.set_duty(Channel::Ch2, duty_v);
        self.pwm.set_duty(Channel::Ch3, duty_w);
    }

    /// 全チャネルを有効化
    pub fn enable_all_channels(&mut self) {
        self.pwm.enable(Channel::Ch1);
        self.pwm.enable(Channel::Ch2);
        self.pwm.enable(Channel::Ch3);
        self.enabled = true;
    }

    /// 全チャネルを無効化
    pub fn disable_all_channels(&mut self) {
        self.pwm.disable(Channel::Ch1);
        self.pwm.disable(Channel::Ch2);
        self.pwm.disable(Channel::Ch3);
        self.enabled = false;
    }

    /// 出力が有効かどうか
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
