//! One backtest run: the strict pipeline
//! validate -> indicators -> signals -> simulate -> report.
//!
//! Every run owns its inputs and state. The per-run [`RunContext`] replaces
//! any notion of a globally selected pair: concurrent runs for different
//! pairs cannot interfere because nothing is shared between invocations.

use serde::Serialize;

use crate::domain::error::SigtraderError;
use crate::domain::indicator::pipeline::{compute_indicators, IndicatorConfig};
use crate::domain::metrics::PerformanceReport;
use crate::domain::ohlcv::{validate_series, Bar};
use crate::domain::signal::{generate_signals, RulePolicy, Signal, SignalConfig};
use crate::domain::simulator::{simulate, SimulationState};

/// Identifies what a run is about, for reports and logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunContext {
    pub pair: String,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub initial_balance: f64,
    pub indicators: IndicatorConfig,
    pub signals: SignalConfig,
}

impl RunConfig {
    /// The indicator set actually computed: whatever the caller asked for,
    /// extended with the series the signal policy reads.
    fn effective_indicators(&self) -> IndicatorConfig {
        let mut config = self.indicators.clone();
        for span in [self.signals.fast_span, self.signals.slow_span] {
            if !config.ema_spans.contains(&span) {
                config.ema_spans.push(span);
            }
        }
        if matches!(self.signals.policy, RulePolicy::Threshold { .. })
            && config.rsi_window != Some(self.signals.rsi_window)
        {
            config.rsi_window = Some(self.signals.rsi_window);
        }
        config
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BacktestOutcome {
    pub context: RunContext,
    pub signals: Vec<Signal>,
    pub state: SimulationState,
    pub report: PerformanceReport,
}

pub fn run_backtest(
    context: RunContext,
    bars: &[Bar],
    config: &RunConfig,
) -> Result<BacktestOutcome, SigtraderError> {
    validate_series(bars)?;

    let indicators = compute_indicators(bars, &config.effective_indicators())?;
    let signals = generate_signals(&indicators, &config.signals, bars.len());
    let state = simulate(config.initial_balance, bars, &signals);
    let report = PerformanceReport::compute(config.initial_balance, bars, &state)?;

    Ok(BacktestOutcome {
        context,
        signals,
        state,
        report,
    })
}
