//! Market data access port trait.
//!
//! Implementations hand the core a fully materialized bar sequence; the core
//! itself decides whether the sequence is fit to run on (`MalformedSeries`).

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::Bar;
use chrono::{DateTime, Utc};

pub trait DataPort {
    /// Up to `limit` most recent bars for a pair at a timeframe, oldest
    /// first as stored.
    fn fetch_ohlcv(
        &self,
        pair: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Bar>, SigtraderError>;

    fn list_pairs(&self, timeframe: &str) -> Result<Vec<String>, SigtraderError>;

    fn data_range(
        &self,
        pair: &str,
        timeframe: &str,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>, usize)>, SigtraderError>;
}
