//! Multi-ticker backtesting.
//!
//! Parses ticker lists from configuration and runs every ticker through the
//! engine independently. Tickers share nothing, so they run in parallel.

use crate::domain::backtest::{run_backtest, BacktestResult};
use crate::domain::error::DualtrendError;
use crate::domain::metrics::TradeStats;
use crate::domain::position::Trade;
use crate::domain::strategy::StrategyParams;
use crate::ports::data_port::DataPort;
use chrono::{Months, NaiveDate};
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

impl From<UniverseError> for DualtrendError {
    fn from(err: UniverseError) -> Self {
        DualtrendError::invalid("data", "tickers", err.to_string())
    }
}

pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

/// How much stored history each ticker is backtested over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    All,
    /// The last N years, counted back from the ticker's latest stored bar.
    Years(u32),
}

impl Lookback {
    pub fn start_date(&self, first: NaiveDate, last: NaiveDate) -> NaiveDate {
        match self {
            Lookback::All => first,
            Lookback::Years(years) => last
                .checked_sub_months(Months::new(years.saturating_mul(12)))
                .map_or(first, |start| start.max(first)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TickerResult {
    pub code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bars: usize,
    pub result: BacktestResult,
    pub stats: TradeStats,
}

#[derive(Debug, Clone)]
pub struct SkippedTicker {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct UniverseResult {
    /// In the order the tickers were requested.
    pub results: Vec<TickerResult>,
    pub skipped: Vec<SkippedTicker>,
}

impl UniverseResult {
    /// Every closed trade tagged with its ticker, ticker by ticker.
    pub fn all_trades(&self) -> impl Iterator<Item = (&str, &Trade)> {
        self.results
            .iter()
            .flat_map(|r| r.result.trades.iter().map(move |t| (r.code.as_str(), t)))
    }

    pub fn aggregate_stats(&self) -> TradeStats {
        let trades: Vec<Trade> = self.all_trades().map(|(_, t)| t.clone()).collect();
        TradeStats::compute(&trades)
    }
}

pub fn run_universe(
    data_port: &dyn DataPort,
    tickers: &[String],
    lookback: Lookback,
    params: &StrategyParams,
) -> Result<UniverseResult, DualtrendError> {
    params.validate()?;

    let outcomes: Vec<Result<TickerResult, SkippedTicker>> = tickers
        .par_iter()
        .map(|code| run_ticker(data_port, code, lookback, params))
        .collect();

    let mut universe = UniverseResult::default();
    for outcome in outcomes {
        match outcome {
            Ok(result) => universe.results.push(result),
            Err(skipped) => universe.skipped.push(skipped),
        }
    }

    if !universe.skipped.is_empty() {
        warn!(
            ran = universe.results.len(),
            skipped = universe.skipped.len(),
            "some tickers were skipped"
        );
    }

    Ok(universe)
}

fn run_ticker(
    data_port: &dyn DataPort,
    code: &str,
    lookback: Lookback,
    params: &StrategyParams,
) -> Result<TickerResult, SkippedTicker> {
    let skip = |reason: SkipReason| {
        match &reason {
            SkipReason::NoData => warn!(code, "skipping: no data found"),
            SkipReason::Failed(e) => warn!(code, error = %e, "skipping"),
        }
        SkippedTicker {
            code: code.to_string(),
            reason,
        }
    };

    let (first, last) = match data_port.get_data_range(code) {
        Ok(Some((first, last, _))) => (first, last),
        Ok(None) => return Err(skip(SkipReason::NoData)),
        Err(e) => return Err(skip(SkipReason::Failed(e.to_string()))),
    };

    let start_date = lookback.start_date(first, last);
    let bars = data_port
        .fetch_ohlcv(code, start_date, last)
        .map_err(|e| skip(SkipReason::Failed(e.to_string())))?;
    if bars.is_empty() {
        return Err(skip(SkipReason::NoData));
    }

    let result =
        run_backtest(&bars, params).map_err(|e| skip(SkipReason::Failed(e.to_string())))?;
    let stats = TradeStats::compute(&result.trades);

    info!(
        code,
        bars = bars.len(),
        trades = result.trades.len(),
        open = result.open_position.is_some(),
        "backtest complete"
    );

    Ok(TickerResult {
        code: code.to_string(),
        start_date,
        end_date: last,
        bars: bars.len(),
        result,
        stats,
    })
}
