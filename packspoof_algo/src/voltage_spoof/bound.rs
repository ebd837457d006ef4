// Implements the calibration bound: the highest pack voltage the MCMe/VPIN output
// hardware can represent for a given true pack voltage.

// Detailed Operation:
// The usable spoofing margin shrinks as the true voltage rises, so the table below is a
// staircase of ~10V wide bands, each subtracting one volt more than the previous band.
// The values come from bench calibration of the output dividers and must be kept as is.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// (exclusive upper bound of the true pack voltage [V], volts subtracted)
const BOUND_TABLE: [(u8, u8); 15] = [
    (109, 6),
    (119, 7),
    (128, 8),
    (138, 9),
    (148, 10),
    (158, 11),
    (167, 12),
    (177, 13),
    (187, 14),
    (197, 15),
    (206, 16),
    (216, 17),
    (226, 18),
    (236, 19),
    (245, 20),
];

/// Offset applied at and above the last table band [volts]
const BOUND_OFFSET_TOP: u8 = 21;

/// Returns the volts subtracted from `actual` for its band.
pub const fn bound_offset(actual: u8) -> u8 {
    let mut i = 0;
    while i < BOUND_TABLE.len() {
        if actual < BOUND_TABLE[i].0 {
            return BOUND_TABLE[i].1;
        }
        i += 1;
    }
    BOUND_OFFSET_TOP
}

/// Maximum spoofed voltage the output hardware can reach.
///
/// # Arguments
/// * `actual` - True pack voltage [volts]
///
/// # Returns
/// Maximum spoofable pack voltage [volts], saturating at 0 for nonsensical inputs
pub const fn max_possible_vspoof(actual: u8) -> u8 {
    actual.saturating_sub(bound_offset(actual))
}
