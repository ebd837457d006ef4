// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::{
    clocks::Clocks,
    pac::TIM3,
    timer::{Timer, TimerConfig, TimerInterrupt},
};

/// Periodic scheduler interrupt on TIM3 with a wrapping millisecond counter.
pub struct TickTimer {
    tim: Timer<TIM3>,
    period_ms: u32,
    now_ms: u32,
}

impl TickTimer {
    /// # Arguments
    /// * `period_ms` - Tick period, at least 1 ms
    pub fn new(tim3: TIM3, clock_cfg: &Clocks, period_ms: u32) -> Self {
        let period_ms = period_ms.max(1);
        let mut timer = Timer::new_tim3(
            tim3,
            1000.0 / period_ms as f32,
            TimerConfig::default(),
            clock_cfg,
        );
        timer.enable_interrupt(TimerInterrupt::Update);
        timer.enable();

        TickTimer {
            tim: timer,
            period_ms,
            now_ms: 0,
        }
    }

    /// Acknowledges the update interrupt and advances the clock by one period.
    pub fn on_update(&mut self) -> u32 {
        self.tim.clear_interrupt(TimerInterrupt::Update);
        self.now_ms = self.now_ms.wrapping_add(self.period_ms);
        self.now_ms
    }

    #[inline(always)]
    pub fn now_ms(&self) -> u32 {
        self.now_ms
    }
}
