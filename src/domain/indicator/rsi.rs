//! RSI (Relative Strength Index) indicator.
//!
//! Per-bar gain = max(C[i]-C[i-1], 0), loss = max(C[i-1]-C[i], 0); average
//! gain/loss is a simple rolling mean over the last `window` changes (no
//! Wilder smoothing).
//!
//! RSI = 100 - 100/(1 + avg_gain/avg_loss); avg_loss == 0 means RSI = 100.
//! Warmup: the first `window` points are invalid — index `window` is the
//! first with a full window of price changes behind it.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::Bar;

pub fn calculate_rsi(bars: &[Bar], window: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    if window == 0 {
        for bar in bars {
            values.push(IndicatorPoint {
                timestamp: bar.timestamp,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            });
        }
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(window),
            values,
        };
    }

    // Per-bar changes; gains[i-1] and losses[i-1] belong to bar i.
    let mut gains: Vec<f64> = Vec::new();
    let mut losses: Vec<f64> = Vec::new();
    for i in 1..bars.len() {
        let change = bars[i].close - bars[i - 1].close;
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    for (i, bar) in bars.iter().enumerate() {
        // Index `window` is the first with `window` changes behind it.
        if i < window {
            values.push(IndicatorPoint {
                timestamp: bar.timestamp,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            });
            continue;
        }

        let start = i - window;
        let avg_gain = gains[start..i].iter().sum::<f64>() / window as f64;
        let avg_loss = losses[start..i].iter().sum::<f64>() / window as f64;
        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid: true,
            value: IndicatorValue::Simple(rsi),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(window),
        values,
    }
}
