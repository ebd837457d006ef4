//! Pins of the spoofed analog outputs and the analog inputs they are derived from.
use super::PinDef;
use super::{PinMode, Port};

/// PWM to the MCM'E' connector divider (TIM2_CH1)
pub const PWM_MCME: PinDef = PinDef {
    port: Port::A,
    pin: 0,
    mode: PinMode::Alt(1),
};

/// PWM to the MCM VPIN input, after the RC filter (TIM2_CH2)
pub const PWM_VPIN_OUT: PinDef = PinDef {
    port: Port::A,
    pin: 1,
    mode: PinMode::Alt(1),
};

/// VPIN from the PDU, through the 100k/10k divider (ADC1_IN3)
pub const VPIN_IN: PinDef = PinDef {
    port: Port::A,
    pin: 2,
    mode: PinMode::Analog,
};

/// Hall current sensor output (ADC1_IN4)
pub const CURRENT_SENSE: PinDef = PinDef {
    port: Port::A,
    pin: 3,
    mode: PinMode::Analog,
};
