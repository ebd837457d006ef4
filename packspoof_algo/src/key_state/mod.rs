// Implements the ignition key debouncer and the coordinator that runs the key lifecycle.

// Key Features:
// - One-sample glitch filter on key-off, key-on is accepted immediately
// - Confirmed transitions reported as events, never the transient filter state
// - Coordinator runs the collaborator hook first, then records the transition time

// Detailed Operation:
// The key line is sampled once per scheduler tick. A single Off sample moves the filter
// into OffJustOccurred, during which the key still reads On. A second consecutive Off
// confirms the transition; an On sample instead returns to On without any event.
// Timestamps are u32 milliseconds and wrap after ~49 days, so elapsed time is computed
// with wrapping arithmetic.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::interfaces::KeyLifecycle;

/// Key state as seen by the rest of the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyState {
    /// No sample taken yet
    Uninitialized,
    On,
    Off,
}

/// Confirmed key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyEvent {
    TurnedOn,
    TurnedOff,
}

/// Filter memory, including the hidden pending-off state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceMemory {
    Uninitialized,
    On,
    Off,
    OffJustOccurred,
}

impl DebounceMemory {
    const fn from_raw(raw_on: bool) -> Self {
        if raw_on {
            DebounceMemory::On
        } else {
            DebounceMemory::Off
        }
    }
}

pub struct KeyStateDebouncer {
    sampled: KeyState,
    previous: DebounceMemory,
    latest_on_time_ms: u32,
    latest_off_time_ms: u32,
}

impl KeyStateDebouncer {
    pub const fn new() -> Self {
        KeyStateDebouncer {
            sampled: KeyState::Uninitialized,
            previous: DebounceMemory::Uninitialized,
            latest_on_time_ms: 0,
            latest_off_time_ms: 0,
        }
    }

    /// Feeds one raw key sample through the filter.
    ///
    /// # Arguments
    /// * `raw_on` - True when the key-on line reads high
    ///
    /// # Returns
    /// The confirmed transition caused by this sample, if any
    pub fn sample(&mut self, raw_on: bool) -> Option<KeyEvent> {
        self.sampled = if raw_on { KeyState::On } else { KeyState::Off };
        let raw = DebounceMemory::from_raw(raw_on);

        match (raw, self.previous) {
            // first off sample: wait for a second one before believing it
            (DebounceMemory::Off, DebounceMemory::On | DebounceMemory::Uninitialized) => {
                self.previous = DebounceMemory::OffJustOccurred;
                None
            }
            // glitch rejected
            (DebounceMemory::On, DebounceMemory::OffJustOccurred) => {
                self.previous = DebounceMemory::On;
                None
            }
            (raw, previous) if raw != previous => {
                self.previous = raw;
                Some(if raw_on {
                    KeyEvent::TurnedOn
                } else {
                    KeyEvent::TurnedOff
                })
            }
            _ => None,
        }
    }

    /// Debounced key state; a pending off still reads On.
    pub fn confirmed_state(&self) -> KeyState {
        if self.previous == DebounceMemory::OffJustOccurred {
            KeyState::On
        } else {
            self.sampled
        }
    }

    /// Samples the key and runs the lifecycle hook for a confirmed transition.
    ///
    /// The transition timestamp is recorded after the hook returns.
    pub fn service<L: KeyLifecycle>(
        &mut self,
        raw_on: bool,
        now_ms: u32,
        lifecycle: &mut L,
    ) -> Option<KeyEvent> {
        let event = self.sample(raw_on);
        match event {
            Some(KeyEvent::TurnedOn) => {
                info!("KEY: on");
                lifecycle.on_key_turned_on();
                self.latest_on_time_ms = now_ms;
            }
            Some(KeyEvent::TurnedOff) => {
                info!("KEY: off");
                lifecycle.on_key_turned_off();
                self.latest_off_time_ms = now_ms;
            }
            None => {}
        }
        event
    }

    #[inline(always)]
    pub fn latest_turn_on_time_ms(&self) -> u32 {
        self.latest_on_time_ms
    }

    #[inline(always)]
    pub fn latest_turn_off_time_ms(&self) -> u32 {
        self.latest_off_time_ms
    }

    #[inline(always)]
    pub fn set_latest_turn_on_time_ms(&mut self, time_ms: u32) {
        self.latest_on_time_ms = time_ms;
    }

    #[inline(always)]
    pub fn set_latest_turn_off_time_ms(&mut self, time_ms: u32) {
        self.latest_off_time_ms = time_ms;
    }

    /// Milliseconds elapsed since the last confirmed key-off, across timer wrap.
    pub fn ms_since_turn_off(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.latest_off_time_ms)
    }
}

impl Default for KeyStateDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct HookLog {
        on_calls: u32,
        off_calls: u32,
    }

    impl KeyLifecycle for HookLog {
        fn on_key_turned_on(&mut self) {
            self.on_calls += 1;
        }
        fn on_key_turned_off(&mut self) {
            self.off_calls += 1;
        }
    }

    fn primed_on() -> KeyStateDebouncer {
        let mut key = KeyStateDebouncer::new();
        assert_eq!(key.sample(true), Some(KeyEvent::TurnedOn));
        key
    }

    #[test]
    fn starts_uninitialized() {
        let key = KeyStateDebouncer::new();
        assert_eq!(key.confirmed_state(), KeyState::Uninitialized);
    }

    #[test]
    fn single_off_glitch_is_rejected() {
        let mut key = primed_on();
        let mut events = 0;
        for raw in [true, true, false, true] {
            events += key.sample(raw).is_some() as u32;
            assert_eq!(key.confirmed_state(), KeyState::On);
        }
        assert_eq!(events, 0);
    }

    #[test]
    fn two_off_samples_confirm_turn_off() {
        let mut key = primed_on();

        assert_eq!(key.sample(true), None);
        assert_eq!(key.confirmed_state(), KeyState::On);
        assert_eq!(key.sample(false), None);
        assert_eq!(key.confirmed_state(), KeyState::On);
        assert_eq!(key.sample(false), Some(KeyEvent::TurnedOff));
        assert_eq!(key.confirmed_state(), KeyState::Off);

        // stays off without further events
        assert_eq!(key.sample(false), None);
        assert_eq!(key.confirmed_state(), KeyState::Off);
    }

    #[test]
    fn turn_on_is_immediate() {
        let mut key = primed_on();
        key.sample(false);
        key.sample(false);

        assert_eq!(key.sample(true), Some(KeyEvent::TurnedOn));
        assert_eq!(key.confirmed_state(), KeyState::On);
    }

    #[test]
    fn power_up_with_key_off_reports_turn_off() {
        let mut key = KeyStateDebouncer::new();
        assert_eq!(key.sample(false), None);
        assert_eq!(key.sample(false), Some(KeyEvent::TurnedOff));
        assert_eq!(key.confirmed_state(), KeyState::Off);
    }

    #[test]
    fn service_runs_hooks_and_stamps_time() {
        let mut hooks = HookLog::default();
        let mut key = KeyStateDebouncer::new();

        assert_eq!(key.service(true, 100, &mut hooks), Some(KeyEvent::TurnedOn));
        assert_eq!(key.service(true, 110, &mut hooks), None);
        assert_eq!(key.latest_turn_on_time_ms(), 100);
        assert_eq!(hooks.on_calls, 1);

        assert_eq!(key.service(false, 120, &mut hooks), None);
        assert_eq!(key.service(false, 130, &mut hooks), Some(KeyEvent::TurnedOff));
        assert_eq!(hooks.off_calls, 1);
        assert_eq!(key.latest_turn_off_time_ms(), 130);
        assert_eq!(key.latest_turn_on_time_ms(), 100);
    }

    #[test]
    fn elapsed_off_time_survives_wrap() {
        let mut key = KeyStateDebouncer::new();
        key.set_latest_turn_off_time_ms(u32::MAX - 9);
        assert_eq!(key.ms_since_turn_off(u32::MAX), 9);
        assert_eq!(key.ms_since_turn_off(20), 30);

        key.set_latest_turn_on_time_ms(5);
        assert_eq!(key.latest_turn_on_time_ms(), 5);
    }
}
