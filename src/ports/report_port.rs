//! Report generation port trait.

use crate::domain::error::DualtrendError;
use crate::domain::universe::UniverseResult;
use std::path::Path;

/// Port for exporting the trade ledger of a universe run.
pub trait ReportPort {
    fn write(&self, result: &UniverseResult, output_path: &Path) -> Result<(), DualtrendError>;
}
