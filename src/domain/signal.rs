//! Per-bar trading signals derived from an indicator set.
//!
//! Two selectable rule policies:
//! - `Threshold` (level-triggered): RSI against oversold/overbought bounds,
//!   gated by a fast-over-slow moving-average trend confirmation.
//! - `Crossover` (edge-triggered): fires only on the bar where the fast EMA
//!   crosses the slow EMA, golden cross for Buy, death cross for Sell.
//!
//! A signal at index i depends on indicator values at indices <= i only.
//! Any index where a required indicator is undefined yields Hold.

use serde::Serialize;

use crate::domain::indicator::{IndicatorSet, IndicatorType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

pub const DEFAULT_OVERSOLD: f64 = 30.0;
pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, PartialEq)]
pub enum RulePolicy {
    Threshold { oversold: f64, overbought: f64 },
    Crossover,
}

impl Default for RulePolicy {
    fn default() -> Self {
        RulePolicy::Threshold {
            oversold: DEFAULT_OVERSOLD,
            overbought: DEFAULT_OVERBOUGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalConfig {
    pub policy: RulePolicy,
    pub rsi_window: usize,
    pub fast_span: usize,
    pub slow_span: usize,
}

/// One signal per bar index, `bar_count` entries.
pub fn generate_signals(
    indicators: &IndicatorSet,
    config: &SignalConfig,
    bar_count: usize,
) -> Vec<Signal> {
    let fast = IndicatorType::Ema(config.fast_span);
    let slow = IndicatorType::Ema(config.slow_span);
    let rsi = IndicatorType::Rsi(config.rsi_window);

    (0..bar_count)
        .map(|i| match &config.policy {
            RulePolicy::Threshold {
                oversold,
                overbought,
            } => threshold_signal(indicators, &rsi, &fast, &slow, i, *oversold, *overbought),
            RulePolicy::Crossover => crossover_signal(indicators, &fast, &slow, i),
        })
        .collect()
}

fn threshold_signal(
    indicators: &IndicatorSet,
    rsi: &IndicatorType,
    fast: &IndicatorType,
    slow: &IndicatorType,
    index: usize,
    oversold: f64,
    overbought: f64,
) -> Signal {
    let (Some(rsi_value), Some(fast_value), Some(slow_value)) = (
        indicators.simple_at(rsi, index),
        indicators.simple_at(fast, index),
        indicators.simple_at(slow, index),
    ) else {
        return Signal::Hold;
    };

    if rsi_value < oversold && fast_value > slow_value {
        Signal::Buy
    } else if rsi_value > overbought && fast_value < slow_value {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

fn crossover_signal(
    indicators: &IndicatorSet,
    fast: &IndicatorType,
    slow: &IndicatorType,
    index: usize,
) -> Signal {
    // A crossing needs a previous bar to cross from.
    if index == 0 {
        return Signal::Hold;
    }

    let (Some(fast_cur), Some(slow_cur), Some(fast_prev), Some(slow_prev)) = (
        indicators.simple_at(fast, index),
        indicators.simple_at(slow, index),
        indicators.simple_at(fast, index - 1),
        indicators.simple_at(slow, index - 1),
    ) else {
        return Signal::Hold;
    };

    if fast_cur > slow_cur && fast_prev <= slow_prev {
        Signal::Buy
    } else if fast_cur < slow_cur && fast_prev >= slow_prev {
        Signal::Sell
    } else {
        Signal::Hold
    }
}
