// Saturating narrowing helpers for the fixed-point spoofing math.
//
// All voltage/current products are evaluated in i32 and only narrowed at the very end,
// so a single helper decides what "out of range" means for each output type.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// Narrows an i32 result into volts [0..255].
///
/// # Arguments
/// * `value` - The wide intermediate result [i32]
///
/// # Returns
/// The value saturated into the u8 range [u8]
#[inline(always)]
pub const fn saturate_u8(value: i32) -> u8 {
    if value < 0 {
        0
    } else if value > u8::MAX as i32 {
        u8::MAX
    } else {
        value as u8
    }
}

/// Clamps an i32 duty result into `[min, max]` PWM counts.
#[inline(always)]
pub const fn clamp_counts(value: i32, min: i16, max: i16) -> i16 {
    if value > max as i32 {
        max
    } else if value < min as i32 {
        min
    } else {
        value as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturate_u8_limits() {
        assert_eq!(saturate_u8(-1), 0);
        assert_eq!(saturate_u8(i32::MIN), 0);
        assert_eq!(saturate_u8(0), 0);
        assert_eq!(saturate_u8(137), 137);
        assert_eq!(saturate_u8(255), 255);
        assert_eq!(saturate_u8(256), 255);
        assert_eq!(saturate_u8(i32::MAX), 255);
    }

    #[test]
    fn clamp_counts_limits() {
        assert_eq!(clamp_counts(-551, 0, 255), 0);
        assert_eq!(clamp_counts(39, 0, 255), 39);
        assert_eq!(clamp_counts(1000, 26, 255), 255);
        assert_eq!(clamp_counts(3, 26, 255), 26);
    }
}
