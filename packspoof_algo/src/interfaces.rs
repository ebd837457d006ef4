// Collaborator interfaces consumed by the spoofing core.
//
// Key Features:
// - Narrow capability traits for the sensors, outputs and key input the core touches
// - Lifecycle hooks invoked on confirmed key transitions
// - No driver types leak into the core; the firmware implements these over its HAL,
//   tests implement them over plain fields

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

/// PWM outputs driven by the spoofing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmChannel {
    /// MCM'E' connector, man-in-the-middle of the isolated HV divider
    A,
    /// VPIN out, 0..5V signal ratiometric to pack voltage
    B,
}

/// Pack measurements available once per tick.
pub trait PackSensors {
    /// True pack voltage from the cell monitor [volts]
    fn read_true_pack_voltage(&mut self) -> u8;
    /// Latest battery current, positive is assist, negative is regen [amps]
    fn read_latest_current(&mut self) -> i16;
    /// Raw VPIN in ADC reading [counts, 0..1023]
    fn read_passthrough_input_counts(&mut self) -> u16;
}

/// Hardware outputs written by the spoofing engine.
pub trait SpoofOutputs {
    fn write_pwm_channel(&mut self, channel: PwmChannel, duty_counts: u8);
    /// Hands the spoofed voltage to the BATTSCI encoder [volts]
    fn write_serial_pack_voltage(&mut self, volts: u8);
}

/// Raw ignition input.
pub trait KeySignal {
    /// Returns true when the 12V key-on line reads high.
    fn read_raw_key_signal(&mut self) -> bool;
}

/// Fan-out executed on confirmed key transitions (buses, sensors, display).
pub trait KeyLifecycle {
    fn on_key_turned_on(&mut self);
    fn on_key_turned_off(&mut self);
}
