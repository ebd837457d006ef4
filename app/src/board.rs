// Binds the STM32G4 peripherals to the spoofing core's collaborator traits.

// Detailed Operation:
// ADC samples are latched once per tick from the DMA buffer, so every read in a tick sees
// the same conversion. The true pack voltage is taken from the VPIN divider until the cell
// monitor driver is brought up; the BATTSCI frame encoder picks up the spoofed voltage
// from `battsci_pack_volts`.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use packspoof_algo::{
    math_integer::saturation::saturate_u8, voltage_spoof::pwm_map::vpin_in_volts, KeyLifecycle,
    KeySignal, PackSensors, PwmChannel, SpoofOutputs,
};
use packspoof_drivers::{
    analog::{self, CURRENT_IDX, SAMPLING_COUNT, VPIN_IN_IDX},
    gpio::{EnableLines, KeyInput},
    pwm::SpoofPwm,
};

pub struct Board {
    pwm: SpoofPwm,
    key: KeyInput,
    lines: EnableLines,
    adc: [u16; SAMPLING_COUNT],
    battsci_pack_volts: u8,
}

impl Board {
    pub fn new(pwm: SpoofPwm, key: KeyInput, lines: EnableLines) -> Self {
        Board {
            pwm,
            key,
            lines,
            adc: [0; SAMPLING_COUNT],
            battsci_pack_volts: 0,
        }
    }

    /// Copies the latest completed ADC sequence.
    #[inline(always)]
    pub fn latch_adc(&mut self, samples: [u16; SAMPLING_COUNT]) {
        self.adc = samples;
    }

    /// Pack voltage the BATTSCI frames report [volts]
    #[inline(always)]
    pub fn battsci_pack_volts(&self) -> u8 {
        self.battsci_pack_volts
    }
}

impl PackSensors for Board {
    fn read_true_pack_voltage(&mut self) -> u8 {
        let counts = analog::vpin_in_counts(self.adc[VPIN_IN_IDX]);
        saturate_u8(vpin_in_volts(counts) as i32)
    }

    fn read_latest_current(&mut self) -> i16 {
        analog::current_amps(self.adc[CURRENT_IDX])
    }

    fn read_passthrough_input_counts(&mut self) -> u16 {
        analog::vpin_in_counts(self.adc[VPIN_IN_IDX])
    }
}

impl SpoofOutputs for Board {
    fn write_pwm_channel(&mut self, channel: PwmChannel, duty_counts: u8) {
        match channel {
            PwmChannel::A => self.pwm.set_mcme(duty_counts),
            PwmChannel::B => self.pwm.set_vpin_out(duty_counts),
        }
    }

    fn write_serial_pack_voltage(&mut self, volts: u8) {
        self.battsci_pack_volts = volts;
    }
}

impl KeySignal for Board {
    fn read_raw_key_signal(&mut self) -> bool {
        self.key.is_on()
    }
}

impl KeyLifecycle for Board {
    fn on_key_turned_on(&mut self) {
        self.lines.set_battsci(true);
        self.lines.set_metsci(true);
        self.lines.set_temp_sensors(true);
        self.lines.set_hmi(true);
        self.lines.set_power_sensors(true);
        self.lines.set_grid_charger(false); // never charge while driving
        self.lines.set_led(true);
    }

    fn on_key_turned_off(&mut self) {
        self.lines.set_battsci(false); // don't backdrive the unpowered MCM
        self.lines.set_metsci(false);
        self.lines.set_power_sensors(false);
        self.lines.set_hmi(false);
        self.lines.set_temp_sensors(false);
        self.lines.set_led(false);
    }
}
