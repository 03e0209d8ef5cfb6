//! Report output port trait.

use std::path::Path;

use crate::domain::error::SigtraderError;
use crate::domain::run::BacktestOutcome;

/// Port for persisting backtest outcomes. The outcome is handed over as an
/// opaque read-only structure; rendering beyond that is out of scope.
pub trait ReportPort {
    fn write(&self, outcome: &BacktestOutcome, output_path: &Path) -> Result<(), SigtraderError>;
}
