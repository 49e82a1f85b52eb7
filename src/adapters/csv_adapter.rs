//! CSV data adapter: a directory holding one `<TICKER>.csv` per instrument
//! with a `date,open,high,low,close,volume` header.
//!
//! File stems match tickers case-insensitively, so `qqq.csv` serves `QQQ`.

use crate::domain::error::DualtrendError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", code))
    }

    /// Exact `<code>.csv` first, then any `.csv` whose stem differs only in case.
    fn find_file(&self, code: &str) -> Option<PathBuf> {
        let exact = self.csv_path(code);
        if exact.exists() {
            return Some(exact);
        }
        fs::read_dir(&self.base_path)
            .ok()?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .find(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| name.strip_suffix(".csv"))
                    .is_some_and(|stem| stem.eq_ignore_ascii_case(code))
            })
    }

    fn load_all(&self, code: &str) -> Result<Vec<OhlcvBar>, DualtrendError> {
        let path = self.find_file(code).unwrap_or_else(|| self.csv_path(code));
        let mut bars = read_bars(&path, code)?;
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

/// Parse every row of a bar file, tagging the bars with `code`.
pub fn read_bars(path: &Path, code: &str) -> Result<Vec<OhlcvBar>, DualtrendError> {
    let content = fs::read_to_string(path).map_err(|e| DualtrendError::Database {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut bars = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| DualtrendError::Database {
            reason: format!("CSV parse error: {}", e),
        })?;

        let date_str = column(&record, 0, "date")?;
        // intraday exports carry a time component; only the day is kept
        let day = date_str.split([' ', 'T']).next().unwrap_or(date_str);
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
            DualtrendError::Database {
                reason: format!("invalid date format '{}': {}", date_str, e),
            }
        })?;

        bars.push(OhlcvBar {
            code: code.to_string(),
            date,
            open: parse_column(&record, 1, "open")?,
            high: parse_column(&record, 2, "high")?,
            low: parse_column(&record, 3, "low")?,
            close: parse_column(&record, 4, "close")?,
            volume: parse_volume(column(&record, 5, "volume")?)?,
        });
    }

    Ok(bars)
}

fn column<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, DualtrendError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| DualtrendError::Database {
            reason: format!("missing {} column", name),
        })
}

fn parse_column<T>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<T, DualtrendError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    column(record, index, name)?
        .parse()
        .map_err(|e| DualtrendError::Database {
            reason: format!("invalid {} value: {}", name, e),
        })
}

/// Adjusted volumes are sometimes exported as floats ("1234.0").
fn parse_volume(raw: &str) -> Result<i64, DualtrendError> {
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.round() as i64)
        .ok_or_else(|| DualtrendError::Database {
            reason: format!("invalid volume value: {}", raw),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, DualtrendError> {
        let mut bars = self.load_all(code)?;
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, DualtrendError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| DualtrendError::Database {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DualtrendError::Database {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(code) = name_str.strip_suffix(".csv") {
                symbols.push(code.to_uppercase());
            }
        }

        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, DualtrendError> {
        if self.find_file(code).is_none() {
            return Ok(None);
        }
        let bars = self.load_all(code)?;
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, bars.len()))),
            _ => Ok(None),
        }
    }
}
