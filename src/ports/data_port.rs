//! Data access port trait.
//!
//! Implementations are shared across the per-ticker worker threads.

use crate::domain::error::DualtrendError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort: Sync {
    /// Bars for `code` within `[start_date, end_date]`, ascending by date.
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, DualtrendError>;

    fn list_symbols(&self) -> Result<Vec<String>, DualtrendError>;

    /// First date, last date and bar count, or `None` when nothing is stored.
    fn get_data_range(
        &self,
        code: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, DualtrendError>;
}
