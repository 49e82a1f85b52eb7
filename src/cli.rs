//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    positive_double, positive_int, validate_data_config, validate_strategy_config,
    DEFAULT_LOOKBACK_YEARS,
};
use crate::domain::error::DualtrendError;
use crate::domain::metrics::TradeStats;
use crate::domain::strategy::{
    StrategyParams, DEFAULT_ATR_MULTIPLIER, DEFAULT_ATR_PERIOD, DEFAULT_FAST_WINDOW,
    DEFAULT_SLOW_WINDOW,
};
use crate::domain::universe::{parse_tickers, run_universe, Lookback, SkipReason, UniverseResult};
use crate::logging::init_logging;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "dualtrend", about = "Dual moving-average trend-following backtester")]
pub struct Cli {
    /// Debug-level diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file
    Init {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Run the strategy over the configured tickers
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated tickers, overriding [data] tickers
        #[arg(long)]
        ticker: Option<String>,
        /// Read `<TICKER>.csv` files from this directory instead of the store
        #[arg(long)]
        csv_dir: Option<PathBuf>,
        /// Export the trade ledger as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Load daily bars from a CSV file into the store
    Import {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: String,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show stored data range for ticker(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
    /// List tickers with stored data
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Init { config } => run_init(&config),
        Command::Backtest {
            config,
            ticker,
            csv_dir,
            output,
        } => run_backtest(
            &config,
            ticker.as_deref(),
            csv_dir.as_deref(),
            output.as_deref(),
        ),
        Command::Import {
            config,
            ticker,
            csv,
        } => run_import(&config, &ticker, &csv),
        Command::Info {
            config,
            ticker,
            csv_dir,
        } => run_info(&config, ticker.as_deref(), csv_dir.as_deref()),
        Command::ListSymbols { config, csv_dir } => run_list_symbols(&config, csv_dir.as_deref()),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, DualtrendError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

pub fn build_strategy_params(config: &dyn ConfigPort) -> Result<StrategyParams, DualtrendError> {
    let window = |key: &str, default: usize| -> Result<usize, DualtrendError> {
        let value = positive_int(config, "strategy", key, default as i64)?;
        usize::try_from(value)
            .map_err(|_| DualtrendError::invalid("strategy", key, format!("{key} is too large")))
    };

    let params = StrategyParams {
        fast_window: window("fast_window", DEFAULT_FAST_WINDOW)?,
        slow_window: window("slow_window", DEFAULT_SLOW_WINDOW)?,
        atr_period: window("atr_period", DEFAULT_ATR_PERIOD)?,
        atr_multiplier: positive_double(
            config,
            "strategy",
            "atr_multiplier",
            DEFAULT_ATR_MULTIPLIER,
        )?,
    };
    params.validate()?;
    Ok(params)
}

pub fn build_lookback(config: &dyn ConfigPort) -> Result<Lookback, DualtrendError> {
    let years = positive_int(config, "data", "lookback_years", DEFAULT_LOOKBACK_YEARS)?;
    let years = u32::try_from(years)
        .map_err(|_| DualtrendError::invalid("data", "lookback_years", "lookback_years is too large"))?;
    Ok(Lookback::Years(years))
}

/// Tickers from `--ticker` when given, otherwise from `[data] tickers`.
pub fn resolve_tickers(
    ticker_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, DualtrendError> {
    let raw = match ticker_override {
        Some(t) => t.to_string(),
        None => config
            .get_non_empty("data", "tickers")
            .ok_or_else(|| DualtrendError::missing("data", "tickers"))?,
    };
    Ok(parse_tickers(&raw)?)
}

/// Bars from `csv_dir` when given, otherwise from the configured store.
pub fn open_data_port(
    config: &dyn ConfigPort,
    csv_dir: Option<&Path>,
) -> Result<Box<dyn DataPort>, DualtrendError> {
    if let Some(dir) = csv_dir {
        return Ok(Box::new(CsvAdapter::new(dir.to_path_buf())));
    }

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::sqlite_adapter::SqliteAdapter;

        let adapter = SqliteAdapter::from_config(config)?;
        adapter.initialize_schema()?;
        Ok(Box::new(adapter))
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = config;
        Err(DualtrendError::Database {
            reason: "built without the sqlite feature; pass --csv-dir".to_string(),
        })
    }
}

fn run_init(config_path: &Path) -> Result<(), DualtrendError> {
    FileConfigAdapter::write_default(config_path)?;
    eprintln!("Default config written to {}", config_path.display());
    Ok(())
}

fn run_backtest(
    config_path: &Path,
    ticker_override: Option<&str>,
    csv_dir: Option<&Path>,
    output_path: Option<&Path>,
) -> Result<(), DualtrendError> {
    let config = load_config(config_path)?;
    validate_strategy_config(&config)?;

    let params = build_strategy_params(&config)?;
    let lookback = build_lookback(&config)?;
    let tickers = resolve_tickers(ticker_override, &config)?;

    let data_port = open_data_port(&config, csv_dir)?;
    let result = run_backtest_pipeline(data_port.as_ref(), &tickers, lookback, &params, output_path)?;

    print!("{}", render_summary(&result));
    if let Some(output) = output_path {
        eprintln!("Trade ledger written to {}", output.display());
    }
    Ok(())
}

/// Backtest every ticker and export the ledger when `output_path` is set.
/// Fails with `NoData` when no ticker produced a result.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    tickers: &[String],
    lookback: Lookback,
    params: &StrategyParams,
    output_path: Option<&Path>,
) -> Result<UniverseResult, DualtrendError> {
    info!(
        tickers = tickers.len(),
        fast = params.fast_window,
        slow = params.slow_window,
        "running backtest"
    );

    let result = run_universe(data_port, tickers, lookback, params)?;

    if result.results.is_empty() {
        return Err(DualtrendError::NoData {
            code: tickers.join(","),
        });
    }

    if let Some(output) = output_path {
        CsvReportAdapter::new().write(&result, output)?;
    }

    Ok(result)
}

pub fn render_summary(result: &UniverseResult) -> String {
    let mut out = String::new();
    let rule = "=".repeat(50);

    for ticker in &result.results {
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(
            out,
            "{}  {} to {} ({} bars)",
            ticker.code, ticker.start_date, ticker.end_date, ticker.bars
        );
        let _ = writeln!(out, "{rule}");

        if ticker.stats.total_trades == 0 {
            let _ = writeln!(out, "No trades");
        } else {
            render_stats(&mut out, &ticker.stats);
            let _ = writeln!(out, "Trades:");
            for trade in &ticker.result.trades {
                let _ = writeln!(
                    out,
                    "  {} {:>10.2} -> {} {:>10.2}  {:>+8.2}%  {}",
                    trade.entry_date,
                    trade.entry_price,
                    trade.exit_date,
                    trade.exit_price,
                    trade.pnl_pct,
                    trade.exit_reason
                );
            }
        }

        if let Some(pos) = &ticker.result.open_position {
            let stop = pos
                .stop_loss
                .map_or_else(|| "none".to_string(), |s| format!("{s:.2}"));
            let _ = writeln!(
                out,
                "Open position:    since {} @ {:.2} (stop {})",
                pos.entry_date, pos.entry_price, stop
            );
        }
    }

    if result.results.len() > 1 {
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "All tickers");
        let _ = writeln!(out, "{rule}");
        render_stats(&mut out, &result.aggregate_stats());
    }

    if !result.skipped.is_empty() {
        let _ = writeln!(out, "\nSkipped:");
        for skipped in &result.skipped {
            match &skipped.reason {
                SkipReason::NoData => {
                    let _ = writeln!(out, "  {}: no data", skipped.code);
                }
                SkipReason::Failed(reason) => {
                    let _ = writeln!(out, "  {}: {}", skipped.code, reason);
                }
            }
        }
    }

    out
}

fn render_stats(out: &mut String, stats: &TradeStats) {
    let _ = writeln!(out, "Total trades:     {}", stats.total_trades);
    let _ = writeln!(out, "Win rate:         {:.1}%", stats.win_rate * 100.0);
    let _ = writeln!(out, "Avg P&L:          {:.2}%", stats.avg_pnl_pct);
    let _ = writeln!(out, "Best trade:       {:.2}%", stats.best_trade_pct);
    let _ = writeln!(out, "Worst trade:      {:.2}%", stats.worst_trade_pct);
    let _ = writeln!(out, "Cumulative P&L:   {:.2}%", stats.cumulative_pnl_pct);
    let _ = writeln!(out, "Compounded:       {:.2}%", stats.compounded_return_pct);
    let _ = writeln!(out, "Payoff ratio:     {:.2}", stats.payoff_ratio);
    let _ = writeln!(
        out,
        "Exits:            {} stop-loss, {} trend reversal",
        stats.stop_loss_exits, stats.trend_reversal_exits
    );
    let _ = writeln!(out, "Avg holding:      {:.1} days", stats.avg_holding_days);
}

fn run_import(config_path: &Path, ticker: &str, csv_path: &Path) -> Result<(), DualtrendError> {
    let config = load_config(config_path)?;
    let code = ticker.trim().to_uppercase();
    if code.is_empty() {
        return Err(DualtrendError::invalid("data", "tickers", "empty ticker"));
    }

    #[cfg(feature = "sqlite")]
    {
        use crate::adapters::csv_adapter::read_bars;
        use crate::adapters::sqlite_adapter::SqliteAdapter;
        use crate::domain::validation::validate_bars;

        let mut bars = read_bars(csv_path, &code)?;
        bars.sort_by_key(|b| b.date);
        validate_bars(&bars)?;

        let store = SqliteAdapter::from_config(&config)?;
        store.initialize_schema()?;
        let count = store.insert_bars(&bars)?;
        eprintln!("Imported {} bars for {}", count, code);
        Ok(())
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (config, csv_path);
        Err(DualtrendError::Database {
            reason: format!("built without the sqlite feature; cannot import {code}"),
        })
    }
}

fn run_info(
    config_path: &Path,
    ticker_override: Option<&str>,
    csv_dir: Option<&Path>,
) -> Result<(), DualtrendError> {
    let config = load_config(config_path)?;
    let tickers = resolve_tickers(ticker_override, &config)?;
    let data_port = open_data_port(&config, csv_dir)?;

    for code in &tickers {
        match data_port.get_data_range(code) {
            Ok(Some((min_date, max_date, count))) => {
                println!("{}: {} bars, {} to {}", code, count, min_date, max_date);
            }
            Ok(None) => eprintln!("{}: no data found", code),
            Err(e) => eprintln!("error querying {}: {}", code, e),
        }
    }
    Ok(())
}

fn run_list_symbols(config_path: &Path, csv_dir: Option<&Path>) -> Result<(), DualtrendError> {
    let config = load_config(config_path)?;
    let data_port = open_data_port(&config, csv_dir)?;

    let symbols = data_port.list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), DualtrendError> {
    let config = load_config(config_path)?;
    validate_data_config(&config)?;
    validate_strategy_config(&config)?;

    let params = build_strategy_params(&config)?;
    let tickers = resolve_tickers(None, &config)?;
    let lookback = build_lookback(&config)?;

    eprintln!("Tickers:   {}", tickers.join(", "));
    if let Lookback::Years(years) = lookback {
        eprintln!("Lookback:  {} years", years);
    }
    eprintln!(
        "Strategy:  SMA({}) / SMA({}), stop {} x ATR({})",
        params.fast_window, params.slow_window, params.atr_multiplier, params.atr_period
    );
    eprintln!("\nConfiguration is valid.");
    Ok(())
}
