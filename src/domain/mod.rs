//! Core domain types and logic.

pub mod ohlcv;
pub mod validation;
pub mod indicator;
pub mod strategy;
pub mod position;
pub mod backtest;
pub mod metrics;
pub mod universe;
pub mod config_validation;
pub mod error;
