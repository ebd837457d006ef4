// Maps the spoofed pack voltage onto the two analog output channels.

// Key Features:
// - MCMe channel: empirical linear map of the actual/spoofed ratio onto PWM counts
// - VPIN out channel: ratiometric rescale of the measured VPIN in voltage
// - Both maps saturate into their physical PWM ranges instead of failing

// Detailed Operation:
// MCMe: counts = actual * 512 / spoof - 551, derived on the bench against the real
// divider. The ratio is taken at x256 then doubled so the quotient stays small.
// VPIN: the MCM's VPIN in is measured rather than the true pack voltage because the two
// differ while the PDU capacitors precharge at key-on. The measurement is scaled by
// spoof/actual and by the 100k/10k divider correction (1.1).

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::math_integer::saturation::clamp_counts;

/// Full-scale duty of the 8-bit spoof PWM [counts]
pub const PWM_COUNTS_MAX: i16 = 255;
pub const MCME_COUNTS_MIN: i16 = 0;
/// MCM ADC rolls under if VPIN is below 0.5V (0.5 / 5 * 256 = 25.6) [counts]
pub const VPIN_OUT_COUNTS_MIN: i16 = 26;

/// Bench-calibrated offset of the MCMe map [counts]
const MCME_COUNTS_OFFSET: i32 = 551;

/// Divider correction RESISTANCE_MCM / RESISTANCE_R34 as a fraction
const V_DIV_CORRECTION_NUM: u32 = 11;
const V_DIV_CORRECTION_DEN: u32 = 10;

/// VPIN in counts to pack volts: counts * 5V / 1023 * 52 ~= counts * 65 / 256
const VPIN_IN_VOLTS_PER_COUNT_Q8: u32 = 65;

/// Duty for the MCMe channel.
///
/// # Arguments
/// * `actual` - True pack voltage [volts]
/// * `spoof` - Spoofed pack voltage [volts]
///
/// # Returns
/// PWM counts in [0, 255]; a zero spoof target saturates high
pub const fn mcme_counts(actual: u8, spoof: u8) -> i16 {
    if spoof == 0 {
        return PWM_COUNTS_MAX;
    }
    let ratio = ((actual as i32) << 8) / spoof as i32;
    clamp_counts((ratio << 1) - MCME_COUNTS_OFFSET, MCME_COUNTS_MIN, PWM_COUNTS_MAX)
}

/// Clamps an operator-entered MCMe duty into range.
#[inline(always)]
pub const fn mcme_static_counts(counts: i16) -> i16 {
    clamp_counts(counts as i32, MCME_COUNTS_MIN, PWM_COUNTS_MAX)
}

/// Converts a raw 10-bit VPIN in reading into pack volts.
#[inline(always)]
pub const fn vpin_in_volts(counts: u16) -> u16 {
    ((counts as u32 * VPIN_IN_VOLTS_PER_COUNT_Q8) >> 8) as u16
}

/// Duty for the VPIN out channel.
///
/// # Arguments
/// * `measured` - Pack voltage measured on VPIN in [volts]
/// * `spoof` - Spoofed pack voltage [volts]
/// * `actual` - True pack voltage [volts]
///
/// # Returns
/// PWM counts in [26, 255]; a zero true voltage saturates high
pub const fn vpin_out_counts(measured: u16, spoof: u8, actual: u8) -> i16 {
    if actual == 0 {
        return PWM_COUNTS_MAX;
    }
    let scaled = measured as u32 * spoof as u32 * V_DIV_CORRECTION_NUM / V_DIV_CORRECTION_DEN;
    let counts = scaled / actual as u32;
    // u32 -> i32 can only exceed the clamp, never wrap negative
    let counts = if counts > i32::MAX as u32 {
        i32::MAX
    } else {
        counts as i32
    };
    clamp_counts(counts, VPIN_OUT_COUNTS_MIN, PWM_COUNTS_MAX)
}
