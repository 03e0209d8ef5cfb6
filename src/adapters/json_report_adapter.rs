//! JSON report adapter.
//!
//! Serializes a full backtest outcome — context, per-bar signals, closed
//! trades, equity curve, and the performance report — into one JSON file
//! for downstream tooling (charting, dashboards).

use std::fs;
use std::path::Path;

use crate::domain::error::SigtraderError;
use crate::domain::run::BacktestOutcome;
use crate::ports::report_port::ReportPort;

#[derive(Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, outcome: &BacktestOutcome, output_path: &Path) -> Result<(), SigtraderError> {
        let json = serde_json::to_string_pretty(outcome).map_err(|e| SigtraderError::Data {
            reason: format!("report serialization failed: {}", e),
        })?;
        fs::write(output_path, json)?;
        Ok(())
    }
}
