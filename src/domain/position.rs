//! Open position and closed trade records.

use chrono::NaiveDate;
use std::fmt;

/// The single long position the engine may hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    /// Fixed at entry. `None` when ATR was not yet available on the entry bar.
    pub stop_loss: Option<f64>,
}

impl Position {
    pub fn open(entry_date: NaiveDate, entry_price: f64, atr: Option<f64>, multiplier: f64) -> Self {
        Self {
            entry_date,
            entry_price,
            stop_loss: atr.map(|a| entry_price - multiplier * a),
        }
    }

    pub fn should_stop_loss(&self, low: f64) -> bool {
        match self.stop_loss {
            Some(stop) => low <= stop,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    StopLoss,
    TrendReversal,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "StopLoss"),
            ExitReason::TrendReversal => write!(f, "TrendReversal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub pnl_pct: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    /// Consume `position` into a ledger entry.
    pub fn close(
        position: Position,
        exit_date: NaiveDate,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> Self {
        Self {
            entry_date: position.entry_date,
            entry_price: position.entry_price,
            exit_date,
            exit_price,
            pnl_pct: pnl_pct(position.entry_price, exit_price),
            exit_reason,
        }
    }

    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }

    pub fn is_win(&self) -> bool {
        self.pnl_pct > 0.0
    }
}

/// (exit - entry) / entry * 100
pub fn pnl_pct(entry_price: f64, exit_price: f64) -> f64 {
    (exit_price - entry_price) / entry_price * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn open_sets_stop_from_atr() {
        let pos = Position::open(date(2), 100.0, Some(2.5), 2.0);
        assert_eq!(pos.stop_loss, Some(95.0));
        assert_eq!(pos.entry_price, 100.0);
        assert_eq!(pos.entry_date, date(2));
    }

    #[test]
    fn open_without_atr_has_no_stop() {
        let pos = Position::open(date(2), 100.0, None, 2.0);
        assert_eq!(pos.stop_loss, None);
        assert!(!pos.should_stop_loss(0.01));
    }

    #[test]
    fn stop_loss_triggers_at_or_below_level() {
        let pos = Position::open(date(2), 100.0, Some(2.5), 2.0);
        assert!(pos.should_stop_loss(94.0));
        assert!(pos.should_stop_loss(95.0));
        assert!(!pos.should_stop_loss(95.01));
    }

    #[test]
    fn pnl_round_trip() {
        assert_eq!(pnl_pct(100.0, 110.0), 10.0);
        assert_eq!(pnl_pct(100.0, 90.0), -10.0);
        assert_eq!(pnl_pct(100.0, 100.0), 0.0);
    }

    #[test]
    fn close_builds_trade() {
        let pos = Position::open(date(2), 100.0, Some(5.0), 2.0);
        let trade = Trade::close(pos, date(12), 110.0, ExitReason::TrendReversal);

        assert_eq!(trade.entry_date, date(2));
        assert_eq!(trade.exit_date, date(12));
        assert_eq!(trade.entry_price, 100.0);
        assert_eq!(trade.exit_price, 110.0);
        assert_eq!(trade.pnl_pct, 10.0);
        assert_eq!(trade.exit_reason, ExitReason::TrendReversal);
        assert_eq!(trade.holding_days(), 10);
        assert!(trade.is_win());
    }

    #[test]
    fn exit_reason_display() {
        assert_eq!(ExitReason::StopLoss.to_string(), "StopLoss");
        assert_eq!(ExitReason::TrendReversal.to_string(), "TrendReversal");
    }
}
