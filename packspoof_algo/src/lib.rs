#![no_std]

// Pack voltage spoofing core for lithium-converted IMA battery packs.
//
// Key Features:
// - Calibration bound, spoofing strategies and PWM maps for the MCMe and VPIN channels
// - Ignition key debouncer gating the engine lifecycle
// - Single per-tick entry point for the firmware scheduler

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

#[macro_use]
mod logging;

pub mod config;
pub mod error;
pub mod interfaces;
pub mod key_state;
pub mod math_integer;
pub mod voltage_spoof;

#[cfg(test)]
pub(crate) mod fake_board;

pub use config::{SpoofConfig, SpoofStrategy, StackSize};
pub use error::ConfigError;
pub use interfaces::{KeyLifecycle, KeySignal, PackSensors, PwmChannel, SpoofOutputs};
pub use key_state::{KeyEvent, KeyState, KeyStateDebouncer};
pub use voltage_spoof::{EngineState, McmeMode, SpoofState, VoltageSpoofEngine};

/// Owns the key debouncer and the spoofing engine, and sequences them once per tick.
pub struct SpoofController {
    key: KeyStateDebouncer,
    engine: VoltageSpoofEngine,
}

/// Forwards key transitions to the board hooks, then to the engine.
struct LifecycleFanout<'a, L: KeyLifecycle> {
    board: &'a mut L,
    engine: &'a mut VoltageSpoofEngine,
}

impl<L: KeyLifecycle> KeyLifecycle for LifecycleFanout<'_, L> {
    fn on_key_turned_on(&mut self) {
        self.board.on_key_turned_on();
        self.engine.handle_key_on();
    }

    fn on_key_turned_off(&mut self) {
        self.board.on_key_turned_off();
        self.engine.handle_key_off();
    }
}

impl SpoofController {
    pub fn new(config: SpoofConfig) -> Self {
        info!(
            "SPOOF: stack {}, strategy {}, offset {}V",
            config.stack,
            config.strategy,
            config.mcme_offset_volts
        );
        Self {
            key: KeyStateDebouncer::new(),
            engine: VoltageSpoofEngine::new(config),
        }
    }

    /// Main update method.
    ///
    /// # Arguments
    /// * `now_ms` - Monotonic millisecond counter, allowed to wrap
    /// * `hw` - Board: key input, lifecycle hooks, pack sensors and spoof outputs
    ///
    /// Samples the key first; the engine only runs while the debounced key reads On.
    pub fn tick<H>(&mut self, now_ms: u32, hw: &mut H) -> Option<KeyEvent>
    where
        H: KeySignal + KeyLifecycle + PackSensors + SpoofOutputs,
    {
        let raw = hw.read_raw_key_signal();
        let event = {
            let mut fanout = LifecycleFanout {
                board: &mut *hw,
                engine: &mut self.engine,
            };
            self.key.service(raw, now_ms, &mut fanout)
        };

        if self.key.confirmed_state() == KeyState::On {
            self.engine.tick(hw);
        }
        event
    }

    #[inline(always)]
    pub fn key(&self) -> &KeyStateDebouncer {
        &self.key
    }

    #[inline(always)]
    pub fn key_mut(&mut self) -> &mut KeyStateDebouncer {
        &mut self.key
    }

    #[inline(always)]
    pub fn engine(&self) -> &VoltageSpoofEngine {
        &self.engine
    }

    #[inline(always)]
    pub fn engine_mut(&mut self) -> &mut VoltageSpoofEngine {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_board::{FakeBoard, Write};

    fn controller(strategy: SpoofStrategy) -> SpoofController {
        SpoofController::new(SpoofConfig::new(StackSize::Small, strategy, 12))
    }

    #[test]
    fn key_on_starts_spoofing_on_same_tick() {
        let mut ctrl = controller(SpoofStrategy::PassTrueVoltage);
        let mut board = FakeBoard::new(170, 0, 669);
        board.key_on = true;

        assert_eq!(ctrl.tick(1, &mut board), Some(KeyEvent::TurnedOn));
        assert_eq!(board.on_hooks, 1);
        assert_eq!(ctrl.engine().status(), EngineState::Active);
        assert_eq!(board.serial_pack_voltage, Some(157));
        assert_eq!(ctrl.key().latest_turn_on_time_ms(), 1);
    }

    #[test]
    fn outputs_written_vpin_then_mcme_then_serial() {
        let mut ctrl = controller(SpoofStrategy::PassTrueVoltage);
        let mut board = FakeBoard::new(170, 0, 669);
        board.key_on = true;

        ctrl.tick(0, &mut board);
        // vpin: 169 * 157 * 1.1 / 170 = 171; mcme: 277 * 2 - 551 = 3
        assert_eq!(
            board.writes(),
            &[
                Some(Write::Pwm(PwmChannel::B, 171)),
                Some(Write::Pwm(PwmChannel::A, 3)),
                Some(Write::Serial(157)),
            ]
        );
    }

    #[test]
    fn key_glitch_keeps_engine_running() {
        let mut ctrl = controller(SpoofStrategy::AssistOnlyBinary);
        let mut board = FakeBoard::new(170, 60, 669);
        board.key_on = true;
        ctrl.tick(0, &mut board);

        board.key_on = false;
        assert_eq!(ctrl.tick(10, &mut board), None);
        assert_eq!(board.off_hooks, 0);

        board.key_on = true;
        board.clear_writes();
        assert_eq!(ctrl.tick(20, &mut board), None);
        assert_eq!(board.serial_pack_voltage, Some(125));
        assert_eq!(board.writes().len(), 3);
    }

    #[test]
    fn confirmed_off_parks_outputs_and_stamps_after_hook() {
        let mut ctrl = controller(SpoofStrategy::PassTrueVoltage);
        let mut board = FakeBoard::new(170, 0, 669);
        board.key_on = true;
        ctrl.tick(0, &mut board);

        board.key_on = false;
        ctrl.tick(10, &mut board);
        board.clear_writes();
        assert_eq!(ctrl.tick(20, &mut board), Some(KeyEvent::TurnedOff));

        assert_eq!(board.off_hooks, 1);
        assert_eq!(ctrl.engine().status(), EngineState::Idle);
        assert_eq!(ctrl.key().latest_turn_off_time_ms(), 20);
        assert!(board.writes().is_empty());

        // nothing written while off
        for now in 30..40 {
            assert_eq!(ctrl.tick(now, &mut board), None);
        }
        assert!(board.writes().is_empty());
        assert_eq!(ctrl.key().ms_since_turn_off(100), 80);
    }

    #[test]
    fn key_cycle_clears_operator_overrides() {
        let mut ctrl = controller(SpoofStrategy::AssistOnlyBinary);
        let mut board = FakeBoard::new(170, 0, 669);
        board.key_on = true;
        ctrl.tick(0, &mut board);

        ctrl.engine_mut().set_static_mcme_counts(90);
        ctrl.engine_mut().set_mcme_offset_volts(40);
        ctrl.tick(1, &mut board);
        assert_eq!(board.pwm_a, Some(90));
        assert_eq!(board.serial_pack_voltage, Some(130));

        board.key_on = false;
        ctrl.tick(2, &mut board);
        ctrl.tick(3, &mut board);
        board.key_on = true;
        assert_eq!(ctrl.tick(4, &mut board), Some(KeyEvent::TurnedOn));

        let state = ctrl.engine().spoof_state();
        assert_eq!(state.mode, McmeMode::UsingTruePack);
        assert_eq!(state.mcme_offset_volts, 12);
        assert_eq!(board.serial_pack_voltage, Some(157));
    }

    #[test]
    fn power_up_with_key_off_never_writes() {
        let mut ctrl = controller(SpoofStrategy::AssistOnlyVariable);
        let mut board = FakeBoard::new(170, 0, 669);

        assert_eq!(ctrl.tick(0, &mut board), None);
        assert_eq!(ctrl.tick(1, &mut board), Some(KeyEvent::TurnedOff));
        assert_eq!(board.off_hooks, 1);
        assert!(board.writes().is_empty());
    }
}
