//! Dual moving-average trend strategy parameters.

use crate::domain::error::DualtrendError;

pub const DEFAULT_FAST_WINDOW: usize = 20;
pub const DEFAULT_SLOW_WINDOW: usize = 60;
pub const DEFAULT_ATR_PERIOD: usize = 14;
pub const DEFAULT_ATR_MULTIPLIER: f64 = 2.0;

/// Trend is fast SMA above slow SMA; the stop sits `atr_multiplier` ATRs
/// below the entry close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParams {
    pub fast_window: usize,
    pub slow_window: usize,
    pub atr_period: usize,
    pub atr_multiplier: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            fast_window: DEFAULT_FAST_WINDOW,
            slow_window: DEFAULT_SLOW_WINDOW,
            atr_period: DEFAULT_ATR_PERIOD,
            atr_multiplier: DEFAULT_ATR_MULTIPLIER,
        }
    }
}

impl StrategyParams {
    /// Reject non-positive windows and multipliers. `slow_window > fast_window`
    /// is not enforced.
    pub fn validate(&self) -> Result<(), DualtrendError> {
        for (key, value) in [
            ("fast_window", self.fast_window),
            ("slow_window", self.slow_window),
            ("atr_period", self.atr_period),
        ] {
            if value == 0 {
                return Err(DualtrendError::invalid(
                    "strategy",
                    key,
                    format!("{key} must be at least 1"),
                ));
            }
        }
        if !self.atr_multiplier.is_finite() || self.atr_multiplier <= 0.0 {
            return Err(DualtrendError::invalid(
                "strategy",
                "atr_multiplier",
                "atr_multiplier must be a positive number",
            ));
        }
        Ok(())
    }

    /// First bar index at which the engine may act.
    pub fn warmup(&self) -> usize {
        self.slow_window
    }
}
