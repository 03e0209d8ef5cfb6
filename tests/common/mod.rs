#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sigtrader::domain::error::SigtraderError;
use sigtrader::domain::indicator::pipeline::IndicatorConfig;
use sigtrader::domain::ohlcv::Bar;
use sigtrader::domain::run::{RunConfig, RunContext};
use sigtrader::domain::signal::{RulePolicy, SignalConfig};
use sigtrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, pair: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(pair.to_string(), bars);
        self
    }

    pub fn with_error(mut self, pair: &str, reason: &str) -> Self {
        self.errors.insert(pair.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        pair: &str,
        _timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Bar>, SigtraderError> {
        if let Some(reason) = self.errors.get(pair) {
            return Err(SigtraderError::Data {
                reason: reason.clone(),
            });
        }
        let mut bars = self.data.get(pair).cloned().unwrap_or_default();
        if bars.len() > limit {
            bars.drain(..bars.len() - limit);
        }
        Ok(bars)
    }

    fn list_pairs(&self, _timeframe: &str) -> Result<Vec<String>, SigtraderError> {
        let mut pairs: Vec<String> = self.data.keys().cloned().collect();
        pairs.sort();
        Ok(pairs)
    }

    fn data_range(
        &self,
        pair: &str,
        _timeframe: &str,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>, usize)>, SigtraderError> {
        match self.data.get(pair) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.timestamp).min().unwrap();
                let max = bars.iter().map(|b| b.timestamp).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn make_bar(pair: &str, day: i64, close: f64) -> Bar {
    Bar {
        pair: pair.to_string(),
        timestamp: base_time() + chrono::Duration::days(day),
        open: close,
        high: close + 1.0,
        low: (close - 1.0).max(0.01),
        close,
        volume: 10.0,
    }
}

pub fn make_bars(pair: &str, closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(pair, i as i64, close))
        .collect()
}

pub fn context(pair: &str) -> RunContext {
    RunContext {
        pair: pair.to_string(),
        timeframe: "1d".to_string(),
    }
}

pub fn threshold_run_config(rsi_window: usize, fast: usize, slow: usize) -> RunConfig {
    RunConfig {
        initial_balance: 10_000.0,
        indicators: IndicatorConfig::default(),
        signals: SignalConfig {
            policy: RulePolicy::Threshold {
                oversold: 30.0,
                overbought: 70.0,
            },
            rsi_window,
            fast_span: fast,
            slow_span: slow,
        },
    }
}

pub fn crossover_run_config(fast: usize, slow: usize) -> RunConfig {
    RunConfig {
        initial_balance: 10_000.0,
        indicators: IndicatorConfig::default(),
        signals: SignalConfig {
            policy: RulePolicy::Crossover,
            rsi_window: 14,
            fast_span: fast,
            slow_span: slow,
        },
    }
}
