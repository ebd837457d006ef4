// Implements the VoltageSpoofEngine, which keeps the MCM's three pack voltage readings
// (MCMe analog, VPIN analog, BATTSCI serial) consistent with each other.

// Key Features:
// - Computes the calibration bound, evaluates the configured strategy and clamps
// - Maps the spoofed voltage onto the MCMe and VPIN out PWM channels
// - Pushes the spoofed voltage to the BATTSCI encoder every tick
// - Operator overrides for the MCMe duty and offset (troubleshooting)

// Detailed Operation:
// The MCM measures pack voltage in three places and throws a P-code if they disagree by
// more than ~10V. Each tick the engine reads the true pack voltage and current, derives
// one spoofed voltage, and drives all three channels from it. Nothing depends on the
// previous tick's output: the only state carried is the configuration, the operator
// overrides and the Idle/Active lifecycle driven by the key.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

pub mod bound;
pub mod pwm_map;
pub mod strategy;

use crate::config::SpoofConfig;
use crate::interfaces::{PackSensors, PwmChannel, SpoofOutputs};

use bound::max_possible_vspoof;
use pwm_map::{mcme_counts, mcme_static_counts, vpin_in_volts, vpin_out_counts};
use strategy::StrategyInputs;

/// Lowest voltage the MCM is shown once the true pack is comfortably above it [volts]
pub const SPOOF_FLOOR_VOLTS: u8 = 120;
/// True pack voltage above which the floor applies [volts]
pub const SPOOF_FLOOR_ENABLE_VOLTS: u8 = 130;

/// Engine lifecycle, driven by confirmed key transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineState {
    /// Key off, nothing is written
    Idle,
    /// Key on, recomputed every tick
    Active,
}

/// Source of the MCMe duty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum McmeMode {
    /// Derived from the true pack voltage every tick
    UsingTruePack,
    /// Operator-entered duty, only bounds checked
    StaticOverride,
}

/// Outputs of the latest tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpoofState {
    pub spoofed_pack_voltage: u8,
    pub pwm_counts_mcme: i16,
    pub pwm_counts_vpin_out: i16,
    pub mode: McmeMode,
    pub mcme_offset_volts: u8,
}

impl SpoofState {
    const fn new(mcme_offset_volts: u8) -> Self {
        SpoofState {
            spoofed_pack_voltage: 0,
            pwm_counts_mcme: 0,
            pwm_counts_vpin_out: 0,
            mode: McmeMode::UsingTruePack,
            mcme_offset_volts,
        }
    }
}

/// Last values sent to the log, so the debug trace only shows changes.
#[derive(Default)]
struct Reported {
    bound: u8,
    mcme: i16,
    vpin_out: i16,
}

pub struct VoltageSpoofEngine {
    config: SpoofConfig,
    status: EngineState,
    spoof: SpoofState,
    reported: Reported,
}

impl VoltageSpoofEngine {
    /// Creates an idle engine for the given configuration.
    pub fn new(config: SpoofConfig) -> Self {
        if config.strategy.is_deprecated() {
            warn!("VSPOOF: {} is deprecated (regen too strong)", config.strategy);
        }
        VoltageSpoofEngine {
            config,
            status: EngineState::Idle,
            spoof: SpoofState::new(config.mcme_offset_volts),
            reported: Reported::default(),
        }
    }

    /// Runs one spoofing cycle: bound, strategy, clamp, both PWM channels, serial.
    ///
    /// Returns the new outputs, or `None` while the engine is idle.
    pub fn tick<H>(&mut self, hw: &mut H) -> Option<SpoofState>
    where
        H: PackSensors + SpoofOutputs,
    {
        if self.status == EngineState::Idle {
            return None;
        }

        let actual = hw.read_true_pack_voltage();
        let current = hw.read_latest_current();
        let measured = vpin_in_volts(hw.read_passthrough_input_counts());

        let spoof = self.calculate_spoofed_voltage(actual, current);
        self.spoof.spoofed_pack_voltage = spoof;

        self.spoof.pwm_counts_vpin_out = vpin_out_counts(measured, spoof, actual);
        self.spoof.pwm_counts_mcme = match self.spoof.mode {
            McmeMode::UsingTruePack => mcme_counts(actual, spoof),
            McmeMode::StaticOverride => mcme_static_counts(self.spoof.pwm_counts_mcme),
        };

        hw.write_pwm_channel(PwmChannel::B, self.spoof.pwm_counts_vpin_out as u8);
        hw.write_pwm_channel(PwmChannel::A, self.spoof.pwm_counts_mcme as u8);
        hw.write_serial_pack_voltage(spoof);

        self.report_changes(actual);
        Some(self.spoof)
    }

    /// Spoofed voltage for the given inputs, after the bound and floor clamp.
    pub fn calculate_spoofed_voltage(&self, actual: u8, current: i16) -> u8 {
        let bound = max_possible_vspoof(actual);
        let inputs = StrategyInputs {
            actual,
            current,
            offset: self.spoof.mcme_offset_volts,
            stack: self.config.stack,
        };
        clamp_spoofed_voltage(self.config.strategy.evaluate(&inputs), actual, bound)
    }

    fn report_changes(&mut self, actual: u8) {
        let bound = max_possible_vspoof(actual);
        if bound != self.reported.bound {
            debug!("VSPOOF: maxPossibleVspoof: {}", bound);
            self.reported.bound = bound;
        }
        if self.spoof.pwm_counts_mcme != self.reported.mcme {
            debug!("VSPOOF: pwmCounts_MCMe: {}", self.spoof.pwm_counts_mcme);
            self.reported.mcme = self.spoof.pwm_counts_mcme;
        }
        if self.spoof.pwm_counts_vpin_out != self.reported.vpin_out {
            debug!("VSPOOF: pwmCounts_VPIN_out: {}", self.spoof.pwm_counts_vpin_out);
            self.reported.vpin_out = self.spoof.pwm_counts_vpin_out;
        }
    }

    /// Key on: restore volatile defaults and start spoofing on the next tick.
    pub fn handle_key_on(&mut self) {
        self.spoof.mode = McmeMode::UsingTruePack;
        self.spoof.mcme_offset_volts = self.config.mcme_offset_volts;
        self.status = EngineState::Active;
        debug!("VSPOOF: active");
    }

    /// Key off: stop spoofing. Outputs keep their last duty.
    pub fn handle_key_off(&mut self) {
        self.status = EngineState::Idle;
        debug!("VSPOOF: idle");
    }

    /// Selects where the MCMe duty comes from.
    #[inline(always)]
    pub fn set_mcme_mode(&mut self, mode: McmeMode) {
        self.spoof.mode = mode;
    }

    /// Pins the MCMe duty to an operator value until the next key on.
    pub fn set_static_mcme_counts(&mut self, counts: u8) {
        self.spoof.mode = McmeMode::StaticOverride;
        self.spoof.pwm_counts_mcme = counts as i16;
    }

    /// Writes a raw MCMe duty straight to the output, bypassing the engine.
    pub fn write_specific_mcme_pwm<O: SpoofOutputs>(&self, counts: u8, outputs: &mut O) {
        outputs.write_pwm_channel(PwmChannel::A, counts);
    }

    #[inline(always)]
    pub fn mcme_offset_volts(&self) -> u8 {
        self.spoof.mcme_offset_volts
    }

    #[inline(always)]
    pub fn set_mcme_offset_volts(&mut self, offset: u8) {
        self.spoof.mcme_offset_volts = offset;
    }

    #[inline(always)]
    pub fn spoofed_pack_voltage(&self) -> u8 {
        self.spoof.spoofed_pack_voltage
    }

    #[inline(always)]
    pub fn pwm_counts_mcme(&self) -> i16 {
        self.spoof.pwm_counts_mcme
    }

    #[inline(always)]
    pub fn pwm_counts_vpin_out(&self) -> i16 {
        self.spoof.pwm_counts_vpin_out
    }

    pub fn spoof_state(&self) -> SpoofState {
        self.spoof
    }

    pub fn status(&self) -> EngineState {
        self.status
    }

    pub fn config(&self) -> &SpoofConfig {
        &self.config
    }
}

/// Applies the hardware bound, then the floor that keeps the MCM out of its stall region.
pub const fn clamp_spoofed_voltage(spoof: u8, actual: u8, bound: u8) -> u8 {
    let spoof = if spoof > bound { bound } else { spoof };
    if spoof < SPOOF_FLOOR_VOLTS && actual > SPOOF_FLOOR_ENABLE_VOLTS {
        SPOOF_FLOOR_VOLTS
    } else {
        spoof
    }
}
