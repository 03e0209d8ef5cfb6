//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal_span) of the MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! All three EMAs use the raw-seed convention (see `ema`), so every point in
//! the series is defined from index 0.

use crate::domain::indicator::ema::ema_over;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::Bar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[Bar],
    fast: usize,
    slow: usize,
    signal_span: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_span,
    };

    if bars.is_empty() || fast == 0 || slow == 0 || signal_span == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ema_over(&closes, fast);
    let ema_slow = ema_over(&closes, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_over(&macd_line, signal_span);

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: true,
            value: IndicatorValue::Macd {
                line: macd_line[i],
                signal: signal_line[i],
                histogram: macd_line[i] - signal_line[i],
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

pub fn calculate_macd_default(bars: &[Bar]) -> IndicatorSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                pair: "BTC/USDT".into(),
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::hours(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1.0,
            })
            .collect()
    }

    fn macd_at(series: &IndicatorSeries, i: usize) -> (f64, f64, f64) {
        match series.values[i].value {
            IndicatorValue::Macd {
                line,
                signal,
                histogram,
            } => (line, signal, histogram),
            _ => panic!("expected Macd value"),
        }
    }

    #[test]
    fn macd_constant_prices_is_zero() {
        let bars = make_bars(&[100.0; 40]);
        let series = calculate_macd_default(&bars);

        for i in 0..40 {
            let (line, signal, histogram) = macd_at(&series, i);
            assert!(line.abs() < 1e-9);
            assert!(signal.abs() < 1e-9);
            assert!(histogram.abs() < 1e-9);
        }
    }

    #[test]
    fn macd_line_is_ema_difference() {
        let bars = make_bars(&[10.0, 12.0, 11.0, 15.0, 14.0, 18.0]);
        let series = calculate_macd(&bars, 2, 4, 3);

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = ema_over(&closes, 2);
        let slow = ema_over(&closes, 4);

        for i in 0..bars.len() {
            let (line, _, _) = macd_at(&series, i);
            assert!((line - (fast[i] - slow[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn macd_signal_smooths_the_line() {
        let bars = make_bars(&[10.0, 12.0, 11.0, 15.0, 14.0, 18.0]);
        let series = calculate_macd(&bars, 2, 4, 3);

        let lines: Vec<f64> = (0..bars.len()).map(|i| macd_at(&series, i).0).collect();
        let expected_signal = ema_over(&lines, 3);

        for i in 0..bars.len() {
            let (_, signal, _) = macd_at(&series, i);
            assert!((signal - expected_signal[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn macd_histogram_is_line_minus_signal() {
        let bars = make_bars(&[10.0, 12.0, 11.0, 15.0]);
        let series = calculate_macd(&bars, 2, 3, 2);

        for i in 0..bars.len() {
            let (line, signal, histogram) = macd_at(&series, i);
            assert!((histogram - (line - signal)).abs() < 1e-12);
        }
    }

    #[test]
    fn macd_rising_prices_positive_line() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&prices);
        let series = calculate_macd_default(&bars);

        // A sustained uptrend keeps the fast EMA above the slow EMA.
        let (line, _, _) = macd_at(&series, 29);
        assert!(line > 0.0);
    }

    #[test]
    fn macd_all_points_valid() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let series = calculate_macd(&bars, 2, 3, 2);
        assert!(series.values.iter().all(|p| p.valid));
    }

    #[test]
    fn macd_zero_span_yields_empty() {
        let bars = make_bars(&[10.0, 11.0]);
        assert!(calculate_macd(&bars, 0, 26, 9).values.is_empty());
        assert!(calculate_macd(&bars, 12, 0, 9).values.is_empty());
        assert!(calculate_macd(&bars, 12, 26, 0).values.is_empty());
    }

    #[test]
    fn macd_indicator_type() {
        let series = calculate_macd_default(&make_bars(&[100.0]));
        assert_eq!(
            series.indicator_type,
            IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            }
        );
    }
}
