//! Bar sequence validation.
//!
//! The engine depends on bar-to-bar continuity, so a malformed sequence is
//! rejected as a whole rather than repaired.

use crate::domain::error::DualtrendError;
use crate::domain::ohlcv::OhlcvBar;

pub fn validate_bars(bars: &[OhlcvBar]) -> Result<(), DualtrendError> {
    for (index, bar) in bars.iter().enumerate() {
        let fail = |reason: String| DualtrendError::DataValidation {
            code: bar.code.clone(),
            index,
            reason,
        };

        for (name, value) in [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ] {
            if !value.is_finite() {
                return Err(fail(format!("{name} is not finite ({value})")));
            }
            if value <= 0.0 {
                return Err(fail(format!("{name} must be positive ({value})")));
            }
        }

        if bar.volume < 0 {
            return Err(fail(format!("negative volume ({})", bar.volume)));
        }

        if index > 0 {
            let prev = &bars[index - 1];
            if bar.date <= prev.date {
                return Err(fail(format!(
                    "date {} does not follow {}",
                    bar.date, prev.date
                )));
            }
        }
    }
    Ok(())
}
