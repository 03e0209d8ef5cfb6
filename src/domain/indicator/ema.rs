//! Exponential Moving Average indicator.
//!
//! k = 2/(span+1); EMA[0] = C[0], then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//!
//! Seeding convention: the series is seeded with the first raw close, not an
//! SMA of the first `span` closes. Both conventions exist in practice; this
//! codebase uses raw-close seeding everywhere (including inside MACD), so an
//! EMA has no warm-up period and every point is valid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::Bar;

pub fn calculate_ema(bars: &[Bar], span: usize) -> IndicatorSeries {
    if span == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(span),
            values: Vec::new(),
        };
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema = ema_over(&closes, span);

    let values = bars
        .iter()
        .zip(ema)
        .map(|(bar, value)| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: true,
            value: IndicatorValue::Simple(value),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(span),
        values,
    }
}

/// Raw-seeded EMA over an arbitrary value sequence. Shared with the MACD
/// signal line, which smooths MACD values rather than closes.
pub(crate) fn ema_over(values: &[f64], span: usize) -> Vec<f64> {
    let k = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = 0.0;

    for (i, &value) in values.iter().enumerate() {
        ema = if i == 0 {
            value
        } else {
            value * k + ema * (1.0 - k)
        };
        out.push(ema);
    }

    out
}
