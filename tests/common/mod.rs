#![allow(dead_code)]

use chrono::NaiveDate;
use dualtrend::domain::error::DualtrendError;
pub use dualtrend::domain::ohlcv::OhlcvBar;
use dualtrend::domain::strategy::StrategyParams;
use dualtrend::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }

    fn check(&self, code: &str) -> Result<(), DualtrendError> {
        match self.errors.get(code) {
            Some(reason) => Err(DualtrendError::Database {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, DualtrendError> {
        self.check(code)?;
        Ok(self
            .data
            .get(code)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, DualtrendError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, DualtrendError> {
        self.check(code)?;
        match self.data.get(code) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Bar with high/low `spread` either side of the close.
pub fn make_bar(code: &str, date: NaiveDate, close: f64, spread: f64) -> OhlcvBar {
    OhlcvBar {
        code: code.to_string(),
        date,
        open: close,
        high: close + spread,
        low: close - spread,
        close,
        volume: 1000,
    }
}

/// One bar per consecutive calendar day starting 2024-01-01.
pub fn generate_bars(code: &str, closes: &[f64], spread: f64) -> Vec<OhlcvBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(code, start + chrono::Duration::days(i as i64), close, spread))
        .collect()
}

/// Parameters the 80-bar scenario is tuned for.
pub fn scenario_params() -> StrategyParams {
    StrategyParams {
        fast_window: 5,
        slow_window: 20,
        atr_period: 14,
        atr_multiplier: 2.0,
    }
}

/// Steady rise, a shallow dip, a sharp rally and then a steady fall.
///
/// With [`scenario_params`] this yields exactly one trade: entry at bar 61
/// (close 160) and a trend-reversal exit at bar 74 (close 165).
pub fn scenario_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..=57).map(|i| 100.0 + i as f64).collect();
    closes.extend([150.0, 148.0, 146.0]);
    closes.extend((61..=64).map(|i| 160.0 + (i - 61) as f64 * 15.0));
    let mut price = 205.0;
    while closes.len() < 80 {
        price -= 4.0;
        closes.push(price);
    }
    closes
}

pub fn scenario_bars(code: &str) -> Vec<OhlcvBar> {
    generate_bars(code, &scenario_closes(), 2.0)
}

pub fn write_csv(dir: &std::path::Path, code: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    std::fs::write(dir.join(format!("{code}.csv")), content).unwrap();
}
