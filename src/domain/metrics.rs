//! Trade ledger statistics.
//!
//! All percentages are in percent units, like `Trade::pnl_pct`.

use super::position::{ExitReason, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct TradeStats {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakeven: usize,
    /// Fraction of trades with positive P&L, 0..=1.
    pub win_rate: f64,
    pub avg_pnl_pct: f64,
    pub best_trade_pct: f64,
    pub worst_trade_pct: f64,
    /// Arithmetic sum of per-trade returns.
    pub cumulative_pnl_pct: f64,
    /// Return from reinvesting through every trade in sequence.
    pub compounded_return_pct: f64,
    /// Average win over average absolute loss.
    pub payoff_ratio: f64,
    pub stop_loss_exits: usize,
    pub trend_reversal_exits: usize,
    pub avg_holding_days: f64,
}

impl TradeStats {
    pub fn compute(trades: &[Trade]) -> Self {
        let total_trades = trades.len();
        if total_trades == 0 {
            return Self::empty();
        }

        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut sum = 0.0_f64;
        let mut growth = 1.0_f64;
        let mut best = f64::NEG_INFINITY;
        let mut worst = f64::INFINITY;
        let mut stop_loss_exits = 0usize;
        let mut trend_reversal_exits = 0usize;
        let mut total_days = 0i64;

        for trade in trades {
            let pnl = trade.pnl_pct;
            if trade.is_win() {
                wins += 1;
                total_wins += pnl;
            } else if pnl < 0.0 {
                losses += 1;
                total_losses += pnl.abs();
            } else {
                breakeven += 1;
            }

            sum += pnl;
            growth *= 1.0 + pnl / 100.0;
            best = best.max(pnl);
            worst = worst.min(pnl);
            total_days += trade.holding_days();

            match trade.exit_reason {
                ExitReason::StopLoss => stop_loss_exits += 1,
                ExitReason::TrendReversal => trend_reversal_exits += 1,
            }
        }

        let avg_win = if wins > 0 {
            total_wins / wins as f64
        } else {
            0.0
        };
        let avg_loss = if losses > 0 {
            total_losses / losses as f64
        } else {
            0.0
        };
        let payoff_ratio = if avg_loss > 0.0 {
            avg_win / avg_loss
        } else if avg_win > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let n = total_trades as f64;
        TradeStats {
            total_trades,
            wins,
            losses,
            breakeven,
            win_rate: wins as f64 / n,
            avg_pnl_pct: sum / n,
            best_trade_pct: best,
            worst_trade_pct: worst,
            cumulative_pnl_pct: sum,
            compounded_return_pct: (growth - 1.0) * 100.0,
            payoff_ratio,
            stop_loss_exits,
            trend_reversal_exits,
            avg_holding_days: total_days as f64 / n,
        }
    }

    fn empty() -> Self {
        TradeStats {
            total_trades: 0,
            wins: 0,
            losses: 0,
            breakeven: 0,
            win_rate: 0.0,
            avg_pnl_pct: 0.0,
            best_trade_pct: 0.0,
            worst_trade_pct: 0.0,
            cumulative_pnl_pct: 0.0,
            compounded_return_pct: 0.0,
            payoff_ratio: 0.0,
            stop_loss_exits: 0,
            trend_reversal_exits: 0,
            avg_holding_days: 0.0,
        }
    }
}
