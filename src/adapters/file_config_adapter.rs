//! INI file configuration adapter.

use crate::domain::error::DualtrendError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Written by `dualtrend init`.
pub const DEFAULT_CONFIG: &str = "\
[data]
; recorded for the market-data downloader; the backtester does not use it
api_key =
tickers = QQQ,AAPL,MSFT,NVDA,AMZN,META,GOOGL,AVGO,TSLA,COST
lookback_years = 10
store_path = stock_data.db

[strategy]
fast_window = 20
slow_window = 60
atr_period = 14
atr_multiplier = 2.0
";

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DualtrendError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| DualtrendError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// Create `path` with [`DEFAULT_CONFIG`]. An existing file is left
    /// untouched and reported as an error.
    pub fn write_default<P: AsRef<Path>>(path: P) -> Result<(), DualtrendError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path.as_ref())?;
        file.write_all(DEFAULT_CONFIG.as_bytes())?;
        Ok(())
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }
}
