//! Average True Range.
//!
//! ATR(n)[i] is the plain rolling mean of the last n true ranges, not
//! Wilder's recursive smoothing. The first bar has no previous close, so
//! its true range is high - low.

use crate::domain::error::DualtrendError;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn true_ranges(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let prev_close = if i == 0 { None } else { Some(bars[i - 1].close) };
            bar.true_range(prev_close)
        })
        .collect()
}

pub fn atr(true_ranges: &[f64], period: usize) -> Result<IndicatorSeries, DualtrendError> {
    if period == 0 {
        return Err(DualtrendError::invalid(
            "strategy",
            "atr_period",
            "ATR period must be at least 1",
        ));
    }

    let values = (0..true_ranges.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let sum: f64 = true_ranges[i + 1 - period..=i].iter().sum();
                Some(sum / period as f64)
            }
        })
        .collect();

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    })
}
