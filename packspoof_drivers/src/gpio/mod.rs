// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use hal::gpio::Pin;

use super::pinout;

/// Raw ignition key input.
pub struct KeyInput {
    pin: Pin,
}

impl KeyInput {
    pub fn new() -> Self {
        KeyInput {
            pin: pinout::control::KEY_ON.init(),
        }
    }

    #[inline(always)]
    pub fn is_on(&self) -> bool {
        self.pin.is_high()
    }
}

/// Supply and transceiver enables switched on key transitions.
pub struct EnableLines {
    battsci: Pin,
    metsci: Pin,
    temp_sensors: Pin,
    hmi: Pin,
    power_sensors: Pin,
    grid_charger: Pin,
    led: Pin,
}

fn drive(pin: &mut Pin, enable: bool) {
    if enable {
        pin.set_high();
    } else {
        pin.set_low();
    }
}

impl EnableLines {
    /// Initializes every line low (all disabled).
    pub fn new() -> Self {
        let mut lines = EnableLines {
            battsci: pinout::control::BATTSCI_EN.init(),
            metsci: pinout::control::METSCI_EN.init(),
            temp_sensors: pinout::control::TEMP_EN.init(),
            hmi: pinout::control::HMI_EN.init(),
            power_sensors: pinout::control::POWER_SENSOR_EN.init(),
            grid_charger: pinout::control::GRID_CHARGER_EN.init(),
            led: pinout::control::LED.init(),
        };
        lines.battsci.set_low();
        lines.metsci.set_low();
        lines.temp_sensors.set_low();
        lines.hmi.set_low();
        lines.power_sensors.set_low();
        lines.grid_charger.set_low();
        lines.led.set_low();
        lines
    }

    pub fn set_battsci(&mut self, enable: bool) {
        drive(&mut self.battsci, enable);
    }

    pub fn set_metsci(&mut self, enable: bool) {
        drive(&mut self.metsci, enable);
    }

    pub fn set_temp_sensors(&mut self, enable: bool) {
        drive(&mut self.temp_sensors, enable);
    }

    pub fn set_hmi(&mut self, enable: bool) {
        drive(&mut self.hmi, enable);
    }

    pub fn set_power_sensors(&mut self, enable: bool) {
        drive(&mut self.power_sensors, enable);
    }

    pub fn set_grid_charger(&mut self, enable: bool) {
        drive(&mut self.grid_charger, enable);
    }

    pub fn set_led(&mut self, on: bool) {
        drive(&mut self.led, on);
    }
}
