// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::{
    clocks::Clocks,
    pac::TIM2,
    timer::{
        Alignment, CaptureCompareDma, CountDir, OutputCompare, TimChannel, Timer, TimerConfig,
        UpdateReqSrc,
    },
};

use super::pinout;

/// Full scale of the 8-bit spoof duty [counts]
const DUTY_COUNTS_FULL_SCALE: u32 = 255;

/// Two PWM channels on TIM2 that synthesize the MCMe and VPIN voltages through RC filters.
pub struct SpoofPwm {
    tim: Timer<TIM2>,
}

impl SpoofPwm {
    pub fn new(tim2: TIM2, clock_cfg: &Clocks, freq: u32) -> Self {
        let timer = Timer::new_tim2(
            tim2,
            freq as f32,
            TimerConfig {
                one_pulse_mode: false,
                update_request_source: UpdateReqSrc::Any,
                auto_reload_preload: true,
                alignment: Alignment::Edge,
                capture_compare_dma: CaptureCompareDma::Update,
                direction: CountDir::Up,
            },
            clock_cfg,
        );

        SpoofPwm { tim: timer }
    }

    pub fn begin(&mut self) {
        // Both outputs start at 0V until the key is confirmed on
        self.tim
            .enable_pwm_output(TimChannel::C1, OutputCompare::Pwm1, 0.0);
        self.tim
            .enable_pwm_output(TimChannel::C2, OutputCompare::Pwm1, 0.0);

        pinout::spoof::PWM_MCME.init();
        pinout::spoof::PWM_VPIN_OUT.init();

        self.tim.enable();
    }

    /// Sets the MCMe duty in 8-bit counts.
    pub fn set_mcme(&mut self, counts: u8) {
        let period = self.tim.get_max_duty();
        self.tim
            .set_duty(TimChannel::C1, Self::counts2period(counts, period));
    }

    /// Sets the VPIN out duty in 8-bit counts.
    pub fn set_vpin_out(&mut self, counts: u8) {
        let period = self.tim.get_max_duty();
        self.tim
            .set_duty(TimChannel::C2, Self::counts2period(counts, period));
    }

    fn counts2period(counts: u8, period: u32) -> u32 {
        counts as u32 * period / DUTY_COUNTS_FULL_SCALE
    }
}
