//! CSV file data adapter.
//!
//! Bars live in `{PAIR}_{TIMEFRAME}.csv` under a base directory, one file
//! per pair/timeframe, with a `/` in the pair name mapped to `-` for the
//! filesystem (BTC/USDT on 1d -> `BTC-USDT_1d.csv`). Columns:
//! `timestamp,open,high,low,close,volume`, timestamps in RFC 3339.
//!
//! Rows are returned in file order — series hygiene (ordering, duplicates,
//! gaps) is checked by the core, not patched up here.

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, pair: &str, timeframe: &str) -> PathBuf {
        let pair = pair.replace('/', "-");
        self.base_path.join(format!("{}_{}.csv", pair, timeframe))
    }

    fn read_all(&self, pair: &str, timeframe: &str) -> Result<Vec<Bar>, SigtraderError> {
        let path = self.csv_path(pair, timeframe);
        let content = fs::read_to_string(&path).map_err(|e| SigtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SigtraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let timestamp_str = record.get(0).ok_or_else(|| SigtraderError::Data {
                reason: "missing timestamp column".into(),
            })?;
            let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
                .map_err(|e| SigtraderError::Data {
                    reason: format!("invalid timestamp '{}': {}", timestamp_str, e),
                })?
                .with_timezone(&Utc);

            let field = |index: usize, name: &str| -> Result<f64, SigtraderError> {
                record
                    .get(index)
                    .ok_or_else(|| SigtraderError::Data {
                        reason: format!("missing {} column", name),
                    })?
                    .parse()
                    .map_err(|e| SigtraderError::Data {
                        reason: format!("invalid {} value: {}", name, e),
                    })
            };

            bars.push(Bar {
                pair: pair.to_string(),
                timestamp,
                open: field(1, "open")?,
                high: field(2, "high")?,
                low: field(3, "low")?,
                close: field(4, "close")?,
                volume: field(5, "volume")?,
            });
        }

        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        pair: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Bar>, SigtraderError> {
        let mut bars = self.read_all(pair, timeframe)?;
        if bars.len() > limit {
            bars.drain(..bars.len() - limit);
        }
        Ok(bars)
    }

    fn list_pairs(&self, timeframe: &str) -> Result<Vec<String>, SigtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SigtraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", timeframe);
        let mut pairs = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| SigtraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(stem) = name_str.strip_suffix(&suffix) {
                pairs.push(stem.replace('-', "/"));
            }
        }

        pairs.sort();
        Ok(pairs)
    }

    fn data_range(
        &self,
        pair: &str,
        timeframe: &str,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>, usize)>, SigtraderError> {
        let bars = match self.read_all(pair, timeframe) {
            Ok(bars) => bars,
            Err(_) => return Ok(None),
        };
        if bars.is_empty() {
            return Ok(None);
        }

        let min = bars.iter().map(|b| b.timestamp).min().unwrap_or_default();
        let max = bars.iter().map(|b| b.timestamp).max().unwrap_or_default();
        Ok(Some((min, max, bars.len())))
    }
}
