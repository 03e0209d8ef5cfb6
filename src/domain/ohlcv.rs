//! OHLCV bar representation and series hygiene.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::error::SigtraderError;

/// One price candle for a trading pair, e.g. one hour of BTC/USDT.
#[derive(Debug, Clone, Serialize)]
pub struct Bar {
    pub pair: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Check a bar sequence before it enters the pipeline.
///
/// Rejected as `MalformedSeries`:
/// - non-positive open/high/low/close,
/// - timestamps not strictly ascending (covers duplicates),
/// - non-uniform spacing between consecutive bars (a gap in a 24/7 feed).
///
/// Downstream stages assume a clean series and do not re-check.
pub fn validate_series(bars: &[Bar]) -> Result<(), SigtraderError> {
    let malformed = |index: usize, reason: String| SigtraderError::MalformedSeries {
        pair: bars[index].pair.clone(),
        reason,
    };

    for (i, bar) in bars.iter().enumerate() {
        if bar.open <= 0.0 || bar.high <= 0.0 || bar.low <= 0.0 || bar.close <= 0.0 {
            return Err(malformed(i, format!("non-positive price at index {i}")));
        }
    }

    let mut interval = None;
    for i in 1..bars.len() {
        let delta = bars[i].timestamp - bars[i - 1].timestamp;
        if delta <= chrono::Duration::zero() {
            let reason = if bars[i].timestamp == bars[i - 1].timestamp {
                format!("duplicate timestamp at index {i}")
            } else {
                format!("non-monotonic timestamp at index {i}")
            };
            return Err(malformed(i, reason));
        }
        match interval {
            None => interval = Some(delta),
            Some(expected) if delta != expected => {
                return Err(malformed(i, format!("gap before index {i}")));
            }
            Some(_) => {}
        }
    }

    Ok(())
}
