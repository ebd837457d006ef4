// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use core::fmt;

/// Rejections raised while resolving the board configuration, before the first tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// None of the spoofing strategies was selected.
    NoStrategySelected,
    /// More than one spoofing strategy was selected (holds the count).
    MultipleStrategiesSelected(u8),
    /// Neither stack size was selected.
    NoStackSelected,
    /// Both stack sizes were selected.
    MultipleStacksSelected,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoStrategySelected => {
                write!(f, "no voltage spoofing strategy selected")
            }
            ConfigError::MultipleStrategiesSelected(count) => {
                write!(f, "{} voltage spoofing strategies selected, expected one", count)
            }
            ConfigError::NoStackSelected => write!(f, "no stack size selected"),
            ConfigError::MultipleStacksSelected => {
                write!(f, "both stack sizes selected, expected one")
            }
        }
    }
}
