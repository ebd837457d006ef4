// Implements the selectable spoofing strategies, one evaluator per variant.

// Key Features:
// - PassTrueVoltage: closest to OEM behavior, spoof the highest representable voltage
// - AssistOnlyBinary: drop to a fixed low voltage during heavy assist
// - AssistOnlyVariable: lower the apparent voltage proportionally to assist current
// - AssistAndRegen: single blend over assist and regen (deprecated, regen too strong)

// Detailed Operation:
// The MCM delivers maximum assist when it believes the pack sits at 120V, so every
// strategy moves the apparent voltage between the true voltage and that point.
// Products of 8-bit voltage and signed current are evaluated in i32, the raw result is
// saturated into u8 and handed back for the common bound/floor clamp.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::config::StackSize;
use crate::math_integer::saturation::saturate_u8;

use super::bound::max_possible_vspoof;

/// Spoofed voltage that always works with a 60S pack [volts]
///
/// Must stay above 0.67 x Vpack at 4.20V/cell (252V -> 169V) and below
/// max_possible_vspoof at 3.18V/cell (191V -> 176V).
pub const LARGE_STACK_SPOOF_VOLTS: u8 = 170;

/// Assist current above which the binary strategy spoofs low [amps]
pub const BINARY_ASSIST_THRESHOLD_AMPS: i16 = 40;
/// Voltage shown to the MCM during heavy assist [volts]
pub const BINARY_ASSIST_SPOOF_VOLTS: u8 = 125;

/// Current range (2^7 amps) over which the variable strategy ramps down
const VARIABLE_CURRENT_RANGE_SHIFT: u8 = 7;

/// Two-thirds point gain of the assist/regen blend (667/4, rounded down)
const BLEND_VOLTAGE_GAIN: i32 = 167;
/// Per-amp term of the blend, trimmed down from 154 to restore gain lost to rounding
const BLEND_CURRENT_GAIN: i32 = 135;
/// Constant term of the blend (32000 mV / 4)
const BLEND_BIAS: i32 = 8000;
const BLEND_SHIFT: u8 = 8;

/// Spoofing strategy, selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpoofStrategy {
    /// Spoof the maximum possible pack voltage at all times
    PassTrueVoltage,
    /// Statically spoof a low voltage during heavy assist
    AssistOnlyBinary,
    /// Variably spoof pack voltage during assist
    AssistOnlyVariable,
    /// Variably spoof during assist and regen (deprecated)
    AssistAndRegen,
}

/// Per-tick inputs shared by every strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyInputs {
    /// True pack voltage [volts]
    pub actual: u8,
    /// Battery current, positive is assist [amps]
    pub current: i16,
    /// MCMe offset calibration [volts]
    pub offset: u8,
    pub stack: StackSize,
}

impl SpoofStrategy {
    /// Evaluates the raw (unclamped) spoofed voltage for this strategy.
    pub fn evaluate(self, inputs: &StrategyInputs) -> u8 {
        let raw = match self {
            SpoofStrategy::PassTrueVoltage => pass_true_voltage(inputs.actual, inputs.stack),
            SpoofStrategy::AssistOnlyBinary => {
                assist_only_binary(inputs.actual, inputs.current, inputs.offset)
            }
            SpoofStrategy::AssistOnlyVariable => {
                assist_only_variable(inputs.actual, inputs.current, inputs.offset)
            }
            SpoofStrategy::AssistAndRegen => assist_and_regen(inputs.actual, inputs.current),
        };
        saturate_u8(raw)
    }

    pub fn is_deprecated(self) -> bool {
        matches!(self, SpoofStrategy::AssistAndRegen)
    }
}

#[inline(always)]
fn pass_true_voltage(actual: u8, stack: StackSize) -> i32 {
    match stack {
        StackSize::Small => max_possible_vspoof(actual) as i32,
        StackSize::Large => LARGE_STACK_SPOOF_VOLTS as i32,
    }
}

#[inline(always)]
fn assist_only_binary(actual: u8, current: i16, offset: u8) -> i32 {
    if current > BINARY_ASSIST_THRESHOLD_AMPS {
        BINARY_ASSIST_SPOOF_VOLTS as i32
    } else {
        // light assist or any regen
        actual as i32 - offset as i32
    }
}

/// spoof = actual - offset + current - (current * actual) / 128
#[inline(always)]
fn assist_only_variable(actual: u8, current: i16, offset: u8) -> i32 {
    let actual = actual as i32;
    let current = current as i32;
    actual - offset as i32 + current - ((current * actual) >> VARIABLE_CURRENT_RANGE_SHIFT)
}

/// spoof = (actual * (167 - current) + 135 * current + 8000) / 256
#[inline(always)]
fn assist_and_regen(actual: u8, current: i16) -> i32 {
    let actual = actual as i32;
    let current = current as i32;
    (actual * (BLEND_VOLTAGE_GAIN - current) + BLEND_CURRENT_GAIN * current + BLEND_BIAS)
        >> BLEND_SHIFT
}
