//! Technical indicators derived from a bar series.
//!
//! Every series is aligned to the bar axis: entry `i` belongs to bar `i`,
//! and warm-up positions hold `None`.
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: one aligned series
//! - `Indicators`: the fast MA / slow MA / ATR bundle the engine consumes

pub mod atr;
pub mod sma;

use crate::domain::error::DualtrendError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::strategy::StrategyParams;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Atr(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    /// Value at bar `index`, `None` during warm-up or past the end.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Indicators {
    pub fast_ma: IndicatorSeries,
    pub slow_ma: IndicatorSeries,
    pub atr: IndicatorSeries,
}

impl Indicators {
    pub fn len(&self) -> usize {
        self.fast_ma.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fast_ma.is_empty()
    }

    /// fast_ma > slow_ma; false while either is unavailable.
    pub fn is_uptrend(&self, index: usize) -> bool {
        match (self.fast_ma.get(index), self.slow_ma.get(index)) {
            (Some(fast), Some(slow)) => fast > slow,
            _ => false,
        }
    }
}

/// Derive the fast MA, slow MA and ATR for `bars` under `params`.
pub fn compute_indicators(
    bars: &[OhlcvBar],
    params: &StrategyParams,
) -> Result<Indicators, DualtrendError> {
    params.validate()?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let fast_ma = sma::moving_average(&closes, params.fast_window)?;
    let slow_ma = sma::moving_average(&closes, params.slow_window)?;
    let atr = atr::atr(&atr::true_ranges(bars), params.atr_period)?;

    Ok(Indicators {
        fast_ma,
        slow_ma,
        atr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                code: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "SMA(20)");
        assert_eq!(IndicatorType::Atr(14).to_string(), "ATR(14)");
    }

    #[test]
    fn series_get_out_of_range_is_none() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Sma(2),
            values: vec![None, Some(1.5)],
        };
        assert_eq!(series.get(0), None);
        assert_eq!(series.get(1), Some(1.5));
        assert_eq!(series.get(2), None);
    }

    #[test]
    fn compute_indicators_aligns_all_series() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let params = StrategyParams {
            fast_window: 2,
            slow_window: 4,
            atr_period: 3,
            atr_multiplier: 2.0,
        };
        let ind = compute_indicators(&bars, &params).unwrap();

        assert_eq!(ind.len(), 6);
        assert_eq!(ind.fast_ma.len(), ind.slow_ma.len());
        assert_eq!(ind.slow_ma.len(), ind.atr.len());
        assert_eq!(ind.fast_ma.values[0], None);
        assert_eq!(ind.fast_ma.values[1], Some(10.5));
        assert_eq!(ind.slow_ma.values[2], None);
        assert_eq!(ind.slow_ma.values[3], Some(11.5));
        assert_eq!(ind.atr.values[1], None);
        assert!(ind.atr.values[2].is_some());
        assert_eq!(ind.fast_ma.indicator_type, IndicatorType::Sma(2));
        assert_eq!(ind.atr.indicator_type, IndicatorType::Atr(3));
    }

    #[test]
    fn uptrend_requires_both_averages() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let params = StrategyParams {
            fast_window: 2,
            slow_window: 4,
            atr_period: 2,
            atr_multiplier: 2.0,
        };
        let ind = compute_indicators(&bars, &params).unwrap();

        assert!(!ind.is_uptrend(0));
        assert!(!ind.is_uptrend(2));
        // rising closes: fast mean leads slow mean
        assert!(ind.is_uptrend(3));
        assert!(ind.is_uptrend(4));
    }

    #[test]
    fn compute_indicators_rejects_zero_window() {
        let bars = make_bars(&[10.0, 11.0]);
        let params = StrategyParams {
            fast_window: 0,
            ..StrategyParams::default()
        };
        assert!(matches!(
            compute_indicators(&bars, &params),
            Err(DualtrendError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn compute_indicators_on_empty_input() {
        let ind = compute_indicators(&[], &StrategyParams::default()).unwrap();
        assert!(ind.is_empty());
        assert!(!ind.is_uptrend(0));
    }
}
