// Test double implementing every collaborator trait over plain fields.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::interfaces::{KeyLifecycle, KeySignal, PackSensors, PwmChannel, SpoofOutputs};

const WRITE_LOG_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    Pwm(PwmChannel, u8),
    Serial(u8),
}

pub struct FakeBoard {
    pub true_pack_voltage: u8,
    pub current: i16,
    pub passthrough_counts: u16,
    pub key_on: bool,

    pub pwm_a: Option<u8>,
    pub pwm_b: Option<u8>,
    pub pwm_writes: u32,
    pub serial_pack_voltage: Option<u8>,
    pub on_hooks: u32,
    pub off_hooks: u32,

    log: [Option<Write>; WRITE_LOG_LEN],
    log_len: usize,
}

impl FakeBoard {
    pub fn new(true_pack_voltage: u8, current: i16, passthrough_counts: u16) -> Self {
        FakeBoard {
            true_pack_voltage,
            current,
            passthrough_counts,
            key_on: false,
            pwm_a: None,
            pwm_b: None,
            pwm_writes: 0,
            serial_pack_voltage: None,
            on_hooks: 0,
            off_hooks: 0,
            log: [None; WRITE_LOG_LEN],
            log_len: 0,
        }
    }

    /// Output writes since the last clear, oldest first.
    pub fn writes(&self) -> &[Option<Write>] {
        &self.log[..self.log_len]
    }

    pub fn clear_writes(&mut self) {
        self.log = [None; WRITE_LOG_LEN];
        self.log_len = 0;
    }

    fn record(&mut self, write: Write) {
        // oldest entries are dropped once full
        if self.log_len == WRITE_LOG_LEN {
            self.log.copy_within(1.., 0);
            self.log_len -= 1;
        }
        self.log[self.log_len] = Some(write);
        self.log_len += 1;
    }
}

impl PackSensors for FakeBoard {
    fn read_true_pack_voltage(&mut self) -> u8 {
        self.true_pack_voltage
    }

    fn read_latest_current(&mut self) -> i16 {
        self.current
    }

    fn read_passthrough_input_counts(&mut self) -> u16 {
        self.passthrough_counts
    }
}

impl SpoofOutputs for FakeBoard {
    fn write_pwm_channel(&mut self, channel: PwmChannel, duty_counts: u8) {
        match channel {
            PwmChannel::A => self.pwm_a = Some(duty_counts),
            PwmChannel::B => self.pwm_b = Some(duty_counts),
        }
        self.pwm_writes += 1;
        self.record(Write::Pwm(channel, duty_counts));
    }

    fn write_serial_pack_voltage(&mut self, volts: u8) {
        self.serial_pack_voltage = Some(volts);
        self.record(Write::Serial(volts));
    }
}

impl KeySignal for FakeBoard {
    fn read_raw_key_signal(&mut self) -> bool {
        self.key_on
    }
}

impl KeyLifecycle for FakeBoard {
    fn on_key_turned_on(&mut self) {
        self.on_hooks += 1;
    }

    fn on_key_turned_off(&mut self) {
        self.off_hooks += 1;
    }
}
