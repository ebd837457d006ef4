// ADC1 scan of the VPIN and current inputs, converted into the units the spoofing logic reads.

// Detailed Operation:
// ADC1 runs a two-channel sequence into a DMA buffer, right aligned 12-bit. The VPIN input
// is reduced to the 10-bit scale its calibration was taken at. The current sensor is a
// bidirectional hall sensor centered at mid-scale.

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::{
    adc::{Adc, AdcDevice, Align, InputType, SampleTime},
    clocks::Clocks,
    pac::ADC1,
};

use super::pinout;

pub const VPIN_IN_CH: u8 = 3;
pub const CURRENT_CH: u8 = 4;

pub const SAMPLING_COUNT: usize = 2;
pub const ADC1_SEQUENCE: [u8; SAMPLING_COUNT] = [VPIN_IN_CH, CURRENT_CH];

/// Buffer positions of each channel in `ADC1_SEQUENCE`
pub const VPIN_IN_IDX: usize = 0;
pub const CURRENT_IDX: usize = 1;

/// Zero-current output of the hall sensor [12-bit counts]
const CURRENT_ZERO_COUNTS: i32 = 2048;
/// Sensor full scale either side of zero [amps]
const CURRENT_FULL_SCALE_AMPS: i32 = 200;

/// Configures ADC1 for the spoof input sequence.
pub fn init_adc1(adc_reg: ADC1, clock_cfg: &Clocks) -> Adc<ADC1> {
    pinout::spoof::VPIN_IN.init();
    pinout::spoof::CURRENT_SENSE.init();

    let mut adc1 = Adc::new_adc1(adc_reg, AdcDevice::One, Default::default(), clock_cfg.systick());

    for (i, ch) in ADC1_SEQUENCE.iter().enumerate() {
        adc1.set_sequence(*ch, i as u8 + 1);
        adc1.set_input_type(*ch, InputType::SingleEnded);
        adc1.set_sample_time(*ch, SampleTime::T47);
    }
    adc1.set_sequence_len(SAMPLING_COUNT as u8);
    adc1.set_align(Align::Right);

    adc1
}

/// 12-bit VPIN sample to the 10-bit scale [counts, 0..1023].
#[inline(always)]
pub fn vpin_in_counts(raw: u16) -> u16 {
    (raw & 0x0FFF) >> 2
}

/// 12-bit hall sensor sample to battery current, positive is assist [amps].
pub fn current_amps(raw: u16) -> i16 {
    let centered = (raw & 0x0FFF) as i32 - CURRENT_ZERO_COUNTS;
    (centered * CURRENT_FULL_SCALE_AMPS / CURRENT_ZERO_COUNTS) as i16
}
