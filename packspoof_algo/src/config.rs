// Board configuration for the spoofing core: stack size, strategy and MCMe offset.
//
// Key Features:
// - Closed enumeration of the two supported stack sizes
// - Boolean selections (one per Cargo feature in the firmware) resolved into exactly one
//   strategy and one stack size, rejecting zero or several
// - All resolution is `const`, so the firmware turns a bad selection into a build error

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

use crate::error::ConfigError;

pub use crate::voltage_spoof::strategy::SpoofStrategy;

/// Constant offset voltage accounting for the MCM HV insulation test [volts]
pub const DEFAULT_MCME_OFFSET_VOLTS: u8 = 12;

/// Number of series cells in the pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StackSize {
    /// 48 cells in series, close enough to the OEM range to pass through
    Small,
    /// 60 cells in series, usually above what the MCM can be shown
    Large,
}

/// Immutable configuration handed to the engine at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpoofConfig {
    pub stack: StackSize,
    pub strategy: SpoofStrategy,
    /// Calibration offset subtracted from the true pack voltage [volts]
    pub mcme_offset_volts: u8,
}

impl SpoofConfig {
    pub const fn new(stack: StackSize, strategy: SpoofStrategy, mcme_offset_volts: u8) -> Self {
        SpoofConfig {
            stack,
            strategy,
            mcme_offset_volts,
        }
    }

    /// Builds the configuration from raw selections.
    ///
    /// # Arguments
    /// * `stack` - Stack size flags
    /// * `strategy` - Strategy flags
    /// * `mcme_offset_volts` - MCMe offset calibration value [volts]
    pub const fn from_selection(
        stack: StackSelection,
        strategy: StrategySelection,
        mcme_offset_volts: u8,
    ) -> Result<Self, ConfigError> {
        let stack = match stack.resolve() {
            Ok(stack) => stack,
            Err(e) => return Err(e),
        };
        let strategy = match strategy.resolve() {
            Ok(strategy) => strategy,
            Err(e) => return Err(e),
        };
        Ok(SpoofConfig::new(stack, strategy, mcme_offset_volts))
    }
}

impl Default for SpoofConfig {
    fn default() -> Self {
        SpoofConfig::new(
            StackSize::Small,
            SpoofStrategy::PassTrueVoltage,
            DEFAULT_MCME_OFFSET_VOLTS,
        )
    }
}

/// One flag per stack size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StackSelection {
    pub small: bool,
    pub large: bool,
}

impl StackSelection {
    pub const fn resolve(&self) -> Result<StackSize, ConfigError> {
        match (self.small, self.large) {
            (true, false) => Ok(StackSize::Small),
            (false, true) => Ok(StackSize::Large),
            (false, false) => Err(ConfigError::NoStackSelected),
            (true, true) => Err(ConfigError::MultipleStacksSelected),
        }
    }
}

/// One flag per spoofing strategy; exactly one must be set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrategySelection {
    pub pass_true_voltage: bool,
    pub assist_only_variable: bool,
    pub assist_only_binary: bool,
    pub assist_and_regen: bool,
}

impl StrategySelection {
    pub const fn resolve(&self) -> Result<SpoofStrategy, ConfigError> {
        let count = self.pass_true_voltage as u8
            + self.assist_only_variable as u8
            + self.assist_only_binary as u8
            + self.assist_and_regen as u8;

        if count == 0 {
            Err(ConfigError::NoStrategySelected)
        } else if count > 1 {
            Err(ConfigError::MultipleStrategiesSelected(count))
        } else if self.pass_true_voltage {
            Ok(SpoofStrategy::PassTrueVoltage)
        } else if self.assist_only_variable {
            Ok(SpoofStrategy::AssistOnlyVariable)
        } else if self.assist_only_binary {
            Ok(SpoofStrategy::AssistOnlyBinary)
        } else {
            Ok(SpoofStrategy::AssistAndRegen)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: StackSelection = StackSelection {
        small: true,
        large: false,
    };

    #[test]
    fn single_strategy_resolves() {
        let selection = StrategySelection {
            assist_only_binary: true,
            ..Default::default()
        };
        assert_eq!(selection.resolve(), Ok(SpoofStrategy::AssistOnlyBinary));

        let selection = StrategySelection {
            assist_and_regen: true,
            ..Default::default()
        };
        assert_eq!(selection.resolve(), Ok(SpoofStrategy::AssistAndRegen));
    }

    #[test]
    fn empty_strategy_selection_is_rejected() {
        assert_eq!(
            StrategySelection::default().resolve(),
            Err(ConfigError::NoStrategySelected)
        );
    }

    #[test]
    fn multiple_strategies_are_rejected() {
        let selection = StrategySelection {
            pass_true_voltage: true,
            assist_only_variable: true,
            assist_and_regen: true,
            ..Default::default()
        };
        assert_eq!(
            selection.resolve(),
            Err(ConfigError::MultipleStrategiesSelected(3))
        );
    }

    #[test]
    fn stack_selection_needs_exactly_one() {
        assert_eq!(SMALL.resolve(), Ok(StackSize::Small));
        assert_eq!(
            StackSelection::default().resolve(),
            Err(ConfigError::NoStackSelected)
        );
        assert_eq!(
            StackSelection {
                small: true,
                large: true
            }
            .resolve(),
            Err(ConfigError::MultipleStacksSelected)
        );
    }

    #[test]
    fn from_selection_propagates_first_error() {
        let config = SpoofConfig::from_selection(
            StackSelection::default(),
            StrategySelection::default(),
            DEFAULT_MCME_OFFSET_VOLTS,
        );
        assert_eq!(config, Err(ConfigError::NoStackSelected));

        let config = SpoofConfig::from_selection(
            SMALL,
            StrategySelection {
                pass_true_voltage: true,
                ..Default::default()
            },
            10,
        );
        assert_eq!(
            config,
            Ok(SpoofConfig::new(
                StackSize::Small,
                SpoofStrategy::PassTrueVoltage,
                10
            ))
        );
    }

    #[test]
    fn default_matches_stock_48s_build() {
        let config = SpoofConfig::default();
        assert_eq!(config.stack, StackSize::Small);
        assert_eq!(config.strategy, SpoofStrategy::PassTrueVoltage);
        assert_eq!(config.mcme_offset_volts, 12);
    }
}
