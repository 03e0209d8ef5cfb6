//! Bollinger Bands indicator.
//!
//! - Middle: rolling mean of close over `window` bars
//! - Upper: middle + multiplier * stddev
//! - Lower: middle - multiplier * stddev
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! The multiplier is stored as an integer x100 so the parameters stay
//! hashable. Warmup: the first (window-1) points are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::Bar;

pub fn calculate_bollinger(bars: &[Bar], window: usize, stddev_mult_x100: u32) -> IndicatorSeries {
    let indicator_type = IndicatorType::Bollinger {
        window,
        stddev_mult_x100,
    };

    if window == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let mult = stddev_mult_x100 as f64 / 100.0;
    let warmup = window - 1;
    let mut values = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        let valid = i >= warmup;

        let (upper, middle, lower) = if valid {
            let slice = &bars[i + 1 - window..=i];
            let middle: f64 = slice.iter().map(|b| b.close).sum::<f64>() / window as f64;
            let variance: f64 = slice
                .iter()
                .map(|b| {
                    let diff = b.close - middle;
                    diff * diff
                })
                .sum::<f64>()
                / window as f64;
            let stddev = variance.sqrt();
            (middle + mult * stddev, middle, middle - mult * stddev)
        } else {
            (0.0, 0.0, 0.0)
        };

        values.push(IndicatorPoint {
            timestamp: bars[i].timestamp,
            valid,
            value: IndicatorValue::Bollinger {
                upper,
                middle,
                lower,
            },
        });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
