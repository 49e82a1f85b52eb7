//! Trade ledger export.

use crate::domain::error::DualtrendError;
use crate::domain::universe::UniverseResult;
use crate::ports::report_port::ReportPort;
use std::path::Path;

const HEADER: [&str; 7] = [
    "ticker",
    "entry_date",
    "entry_price",
    "exit_date",
    "exit_price",
    "pnl_pct",
    "exit_reason",
];

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn report_err(e: impl std::fmt::Display) -> DualtrendError {
    DualtrendError::Report {
        reason: e.to_string(),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &UniverseResult, output_path: &Path) -> Result<(), DualtrendError> {
        let mut writer = csv::Writer::from_path(output_path).map_err(report_err)?;
        writer.write_record(HEADER).map_err(report_err)?;

        for (code, trade) in result.all_trades() {
            writer
                .write_record([
                    code.to_string(),
                    trade.entry_date.format("%Y-%m-%d").to_string(),
                    format!("{:.4}", trade.entry_price),
                    trade.exit_date.format("%Y-%m-%d").to_string(),
                    format!("{:.4}", trade.exit_price),
                    format!("{:.4}", trade.pnl_pct),
                    trade.exit_reason.to_string(),
                ])
                .map_err(report_err)?;
        }

        writer.flush().map_err(report_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::BacktestResult;
    use crate::domain::metrics::TradeStats;
    use crate::domain::position::{pnl_pct, ExitReason, Trade};
    use crate::domain::universe::TickerResult;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn ticker(code: &str, trades: Vec<Trade>) -> TickerResult {
        let stats = TradeStats::compute(&trades);
        TickerResult {
            code: code.to_string(),
            start_date: d(1),
            end_date: d(30),
            bars: 30,
            result: BacktestResult {
                trades,
                open_position: None,
                bars_processed: 30,
            },
            stats,
        }
    }

    fn trade(entry: f64, exit: f64, reason: ExitReason) -> Trade {
        Trade {
            entry_date: d(4),
            entry_price: entry,
            exit_date: d(12),
            exit_price: exit,
            pnl_pct: pnl_pct(entry, exit),
            exit_reason: reason,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        let result = UniverseResult {
            results: vec![
                ticker("QQQ", vec![trade(100.0, 110.0, ExitReason::TrendReversal)]),
                ticker("AAPL", vec![trade(200.0, 190.0, ExitReason::StopLoss)]),
            ],
            skipped: vec![],
        };

        CsvReportAdapter::new().write(&result, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "ticker,entry_date,entry_price,exit_date,exit_price,pnl_pct,exit_reason"
        );
        assert!(lines[1].starts_with("QQQ,2024-03-04,100.0000,2024-03-12,110.0000,10.0000,"));
        assert!(lines[2].starts_with("AAPL,"));
        assert!(lines[2].contains("-5.0000"));
    }

    #[test]
    fn empty_result_writes_only_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");

        CsvReportAdapter::new()
            .write(&UniverseResult::default(), &path)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn unwritable_path_is_report_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing_dir").join("trades.csv");

        let result = CsvReportAdapter::new().write(&UniverseResult::default(), &path);
        assert!(matches!(result, Err(DualtrendError::Report { .. })));
    }
}
