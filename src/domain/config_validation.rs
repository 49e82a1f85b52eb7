//! Configuration validation.
//!
//! Runs before any bars are loaded so a bad file fails fast with a
//! config exit code.

use crate::domain::error::DualtrendError;
use crate::domain::strategy::{
    DEFAULT_ATR_MULTIPLIER, DEFAULT_ATR_PERIOD, DEFAULT_FAST_WINDOW, DEFAULT_SLOW_WINDOW,
};
use crate::domain::universe::parse_tickers;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_LOOKBACK_YEARS: i64 = 10;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), DualtrendError> {
    validate_tickers(config)?;
    positive_int(config, "data", "lookback_years", DEFAULT_LOOKBACK_YEARS)?;
    validate_store_path(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), DualtrendError> {
    positive_int(config, "strategy", "fast_window", DEFAULT_FAST_WINDOW as i64)?;
    positive_int(config, "strategy", "slow_window", DEFAULT_SLOW_WINDOW as i64)?;
    positive_int(config, "strategy", "atr_period", DEFAULT_ATR_PERIOD as i64)?;
    positive_double(config, "strategy", "atr_multiplier", DEFAULT_ATR_MULTIPLIER)?;
    Ok(())
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<(), DualtrendError> {
    let tickers = config
        .get_non_empty("data", "tickers")
        .ok_or_else(|| DualtrendError::missing("data", "tickers"))?;
    parse_tickers(&tickers)?;
    Ok(())
}

fn validate_store_path(config: &dyn ConfigPort) -> Result<(), DualtrendError> {
    match config.get_non_empty("data", "store_path") {
        Some(_) => Ok(()),
        None => Err(DualtrendError::missing("data", "store_path")),
    }
}

/// Integer option that must be at least 1. Absent keys take `default`;
/// present but non-numeric values are rejected rather than defaulted.
pub fn positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, DualtrendError> {
    let value = match config.get_non_empty(section, key) {
        None => default,
        Some(raw) => raw.parse::<i64>().map_err(|_| {
            DualtrendError::invalid(section, key, format!("{key} must be an integer, got '{raw}'"))
        })?,
    };
    if value < 1 {
        return Err(DualtrendError::invalid(
            section,
            key,
            format!("{key} must be at least 1"),
        ));
    }
    Ok(value)
}

/// Float option that must be finite and strictly positive.
pub fn positive_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, DualtrendError> {
    let value = match config.get_non_empty(section, key) {
        None => default,
        Some(raw) => raw.parse::<f64>().map_err(|_| {
            DualtrendError::invalid(section, key, format!("{key} must be a number, got '{raw}'"))
        })?,
    };
    if !value.is_finite() || value <= 0.0 {
        return Err(DualtrendError::invalid(
            section,
            key,
            format!("{key} must be a positive number"),
        ));
    }
    Ok(value)
}
