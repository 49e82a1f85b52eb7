//! Backtest engine: single-position state machine over daily bars.
//!
//! Flat → Long when the trend is up and the close crosses above the fast MA:
//! `close[i-1] <= fast[i-1] < close[i]`. Long → Flat on the first of
//! 1. stop-loss: `low[i] <= stop`, filled exactly at the stop level;
//! 2. trend reversal: uptrend on bar i-1 but not on bar i, filled at close.
//!
//! Iteration starts at `slow_window`. A position still open after the last
//! bar is returned separately and never enters the ledger.

use crate::domain::error::DualtrendError;
use crate::domain::indicator::{compute_indicators, Indicators};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::position::{ExitReason, Position, Trade};
use crate::domain::strategy::StrategyParams;
use crate::domain::validation::validate_bars;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    /// Closed trades in exit order.
    pub trades: Vec<Trade>,
    pub open_position: Option<Position>,
    /// Bars the state machine actually visited (post warm-up).
    pub bars_processed: usize,
}

#[derive(Debug)]
enum EngineState {
    Flat,
    Long(Position),
}

/// Validate `params` and `bars`, derive the indicators and run the engine.
///
/// Fewer bars than the warm-up yields an empty ledger, not an error.
pub fn run_backtest(
    bars: &[OhlcvBar],
    params: &StrategyParams,
) -> Result<BacktestResult, DualtrendError> {
    params.validate()?;
    validate_bars(bars)?;
    let indicators = compute_indicators(bars, params)?;
    Ok(simulate(bars, &indicators, params))
}

/// Run the engine against indicators the caller already derived.
pub fn run_backtest_with_indicators(
    bars: &[OhlcvBar],
    indicators: &Indicators,
    params: &StrategyParams,
) -> Result<BacktestResult, DualtrendError> {
    params.validate()?;
    validate_bars(bars)?;

    for series in [&indicators.fast_ma, &indicators.slow_ma, &indicators.atr] {
        if series.len() != bars.len() {
            return Err(DualtrendError::DataValidation {
                code: bars.first().map(|b| b.code.clone()).unwrap_or_default(),
                index: series.len().min(bars.len()),
                reason: format!(
                    "{} has {} values for {} bars",
                    series.indicator_type,
                    series.len(),
                    bars.len()
                ),
            });
        }
    }

    Ok(simulate(bars, indicators, params))
}

fn simulate(bars: &[OhlcvBar], indicators: &Indicators, params: &StrategyParams) -> BacktestResult {
    let start = params.warmup();
    let mut trades = Vec::new();
    let mut state = EngineState::Flat;

    for i in start..bars.len() {
        let bar = &bars[i];
        state = match state {
            EngineState::Flat => {
                if indicators.is_uptrend(i) && crosses_above_fast(bars, indicators, i) {
                    let position = Position::open(
                        bar.date,
                        bar.close,
                        indicators.atr.get(i),
                        params.atr_multiplier,
                    );
                    debug!(
                        code = %bar.code,
                        date = %bar.date,
                        entry_price = position.entry_price,
                        stop_loss = ?position.stop_loss,
                        "entry"
                    );
                    EngineState::Long(position)
                } else {
                    EngineState::Flat
                }
            }
            EngineState::Long(position) => match exit_signal(&position, bars, indicators, i) {
                Some((exit_price, reason)) => {
                    let trade = Trade::close(position, bar.date, exit_price, reason);
                    debug!(
                        code = %bar.code,
                        date = %bar.date,
                        exit_price,
                        pnl_pct = trade.pnl_pct,
                        reason = %reason,
                        "exit"
                    );
                    trades.push(trade);
                    EngineState::Flat
                }
                None => EngineState::Long(position),
            },
        };
    }

    let open_position = match state {
        EngineState::Flat => None,
        EngineState::Long(position) => Some(position),
    };

    BacktestResult {
        trades,
        open_position,
        bars_processed: bars.len().saturating_sub(start),
    }
}

/// `close[i-1] <= fast[i-1] < close[i]`. The current close is compared with
/// the previous bar's fast MA.
fn crosses_above_fast(bars: &[OhlcvBar], indicators: &Indicators, i: usize) -> bool {
    match indicators.fast_ma.get(i - 1) {
        Some(prev_fast) => bars[i - 1].close <= prev_fast && prev_fast < bars[i].close,
        None => false,
    }
}

fn exit_signal(
    position: &Position,
    bars: &[OhlcvBar],
    indicators: &Indicators,
    i: usize,
) -> Option<(f64, ExitReason)> {
    let bar = &bars[i];
    if position.should_stop_loss(bar.low) {
        // should_stop_loss is only true when a stop level exists
        return position.stop_loss.map(|stop| (stop, ExitReason::StopLoss));
    }
    if indicators.is_uptrend(i - 1) && !indicators.is_uptrend(i) {
        return Some((bar.close, ExitReason::TrendReversal));
    }
    None
}
