//! Indicator pipeline: compute every configured indicator for a bar series.
//!
//! The configuration enumerates which indicators to compute and with what
//! parameters. The pipeline is all-or-nothing: if the series is shorter than
//! the largest configured window it fails with `InsufficientData` instead of
//! producing a mostly-undefined output.

use crate::domain::error::SigtraderError;
use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::macd::calculate_macd;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::IndicatorSet;
use crate::domain::ohlcv::Bar;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacdParams {
    pub fast_span: usize,
    pub slow_span: usize,
    pub signal_span: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BollingerParams {
    pub window: usize,
    pub stddev_mult_x100: u32,
}

/// Which indicators to compute. The signal policies need two moving
/// averages, so EMA takes a list of spans rather than a single one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorConfig {
    pub ema_spans: Vec<usize>,
    pub rsi_window: Option<usize>,
    pub macd: Option<MacdParams>,
    pub bollinger: Option<BollingerParams>,
}

impl IndicatorConfig {
    /// The largest window any configured indicator needs.
    pub fn largest_window(&self) -> usize {
        let mut largest = 0;
        for &span in &self.ema_spans {
            largest = largest.max(span);
        }
        if let Some(window) = self.rsi_window {
            largest = largest.max(window);
        }
        if let Some(macd) = &self.macd {
            largest = largest
                .max(macd.fast_span)
                .max(macd.slow_span)
                .max(macd.signal_span);
        }
        if let Some(bollinger) = &self.bollinger {
            largest = largest.max(bollinger.window);
        }
        largest
    }
}

pub fn compute_indicators(
    bars: &[Bar],
    config: &IndicatorConfig,
) -> Result<IndicatorSet, SigtraderError> {
    let minimum = config.largest_window();
    if bars.len() < minimum {
        return Err(SigtraderError::InsufficientData {
            pair: bars.first().map(|b| b.pair.clone()).unwrap_or_default(),
            bars: bars.len(),
            minimum,
        });
    }

    let mut set = IndicatorSet::new();

    for &span in &config.ema_spans {
        set.insert(calculate_ema(bars, span));
    }
    if let Some(window) = config.rsi_window {
        set.insert(calculate_rsi(bars, window));
    }
    if let Some(macd) = &config.macd {
        set.insert(calculate_macd(
            bars,
            macd.fast_span,
            macd.slow_span,
            macd.signal_span,
        ));
    }
    if let Some(bollinger) = &config.bollinger {
        set.insert(calculate_bollinger(
            bars,
            bollinger.window,
            bollinger.stddev_mult_x100,
        ));
    }

    Ok(set)
}
