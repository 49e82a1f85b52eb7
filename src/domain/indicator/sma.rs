//! Simple Moving Average of closing prices.
//!
//! SMA(n)[i] = (P[i-n+1] + ... + P[i]) / n
//! Warmup: first (n-1) bars are unavailable.

use crate::domain::error::DualtrendError;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn moving_average(closes: &[f64], window: usize) -> Result<IndicatorSeries, DualtrendError> {
    if window == 0 {
        return Err(DualtrendError::invalid(
            "strategy",
            "window",
            "moving average window must be at least 1",
        ));
    }

    // summed afresh per window, no running total
    let values = (0..closes.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let sum: f64 = closes[i + 1 - window..=i].iter().sum();
                Some(sum / window as f64)
            }
        })
        .collect();

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Sma(window),
        values,
    })
}
