use super::PinDef;
use super::{PinMode, Port};

/// 12V key-on sense, through the input clamp
pub const KEY_ON: PinDef = PinDef {
    port: Port::B,
    pin: 0,
    mode: PinMode::Input,
};

/// BATTSCI transceiver enable
pub const BATTSCI_EN: PinDef = PinDef {
    port: Port::B,
    pin: 3,
    mode: PinMode::Output,
};

/// METSCI transceiver enable
pub const METSCI_EN: PinDef = PinDef {
    port: Port::B,
    pin: 4,
    mode: PinMode::Output,
};

/// Thermistor bias supply
pub const TEMP_EN: PinDef = PinDef {
    port: Port::B,
    pin: 5,
    mode: PinMode::Output,
};

/// Dash display/button supply
pub const HMI_EN: PinDef = PinDef {
    port: Port::B,
    pin: 6,
    mode: PinMode::Output,
};

/// Current sensor and VPIN divider supply
pub const POWER_SENSOR_EN: PinDef = PinDef {
    port: Port::B,
    pin: 7,
    mode: PinMode::Output,
};

/// Grid charger relay, high = charging allowed
pub const GRID_CHARGER_EN: PinDef = PinDef {
    port: Port::B,
    pin: 8,
    mode: PinMode::Output,
};

pub const LED: PinDef = PinDef {
    port: Port::B,
    pin: 14,
    mode: PinMode::Output,
};
