//! Domain error types.

/// Top-level error type for dualtrend.
#[derive(Debug, thiserror::Error)]
pub enum DualtrendError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid bar data for {code} at bar {index}: {reason}")]
    DataValidation {
        code: String,
        index: usize,
        reason: String,
    },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DualtrendError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        DualtrendError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(section: &str, key: &str) -> Self {
        DualtrendError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DualtrendError::ConfigParse { .. }
                | DualtrendError::ConfigMissing { .. }
                | DualtrendError::ConfigInvalid { .. }
        )
    }
}

impl From<&DualtrendError> for std::process::ExitCode {
    fn from(err: &DualtrendError) -> Self {
        let code: u8 = match err {
            DualtrendError::Io(_) | DualtrendError::Report { .. } => 1,
            DualtrendError::ConfigParse { .. }
            | DualtrendError::ConfigMissing { .. }
            | DualtrendError::ConfigInvalid { .. } => 2,
            DualtrendError::Database { .. } | DualtrendError::DatabaseQuery { .. } => 3,
            DualtrendError::DataValidation { .. } => 4,
            DualtrendError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
