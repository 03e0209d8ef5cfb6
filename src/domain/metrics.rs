//! Performance metrics over a finished simulation run.
//!
//! Sharpe ratio and max drawdown are computed over the raw close series
//! (buy-and-hold volatility), independent of the strategy's trade timing;
//! return and win-rate figures come from the simulation state.

use serde::Serialize;

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::Bar;
use crate::domain::simulator::SimulationState;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const CALENDAR_DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
    pub win_rate_pct: f64,
}

impl PerformanceReport {
    pub fn compute(
        initial_balance: f64,
        bars: &[Bar],
        state: &SimulationState,
    ) -> Result<Self, SigtraderError> {
        let span_days = match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => (last.timestamp - first.timestamp).num_days(),
            _ => 0,
        };
        if span_days <= 0 {
            return Err(SigtraderError::DegenerateSpan {
                reason: format!(
                    "{} bars spanning {} whole days",
                    bars.len(),
                    span_days.max(0)
                ),
            });
        }

        let final_equity = state.final_equity(bars);
        let total_return_pct = (final_equity - initial_balance) / initial_balance * 100.0;

        let annualized_return_pct = ((1.0 + total_return_pct / 100.0)
            .powf(CALENDAR_DAYS_PER_YEAR / span_days as f64)
            - 1.0)
            * 100.0;

        let daily_returns = daily_returns(bars);
        let sharpe_ratio = sharpe(&daily_returns);
        let max_drawdown_pct = max_drawdown_pct(&daily_returns);

        let win_rate_pct = if state.trades.is_empty() {
            0.0
        } else {
            let wins = state.trades.iter().filter(|t| t.is_win()).count();
            wins as f64 / state.trades.len() as f64 * 100.0
        };

        Ok(PerformanceReport {
            total_return_pct,
            annualized_return_pct,
            sharpe_ratio,
            max_drawdown_pct,
            win_rate_pct,
        })
    }
}

fn daily_returns(bars: &[Bar]) -> Vec<f64> {
    bars.windows(2)
        .map(|w| w[1].close / w[0].close - 1.0)
        .collect()
}

/// Annualized Sharpe with no risk-free term: 0 when volatility is zero,
/// never NaN or infinite.
fn sharpe(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}

/// Worst peak-to-trough decline of the cumulative return path, as a
/// percentage <= 0.
fn max_drawdown_pct(returns: &[f64]) -> f64 {
    let mut cumulative = 1.0;
    let mut peak = 1.0;
    let mut worst = 0.0_f64;

    for r in returns {
        cumulative *= 1.0 + r;
        if cumulative > peak {
            peak = cumulative;
        }
        let drawdown = (cumulative - peak) / peak;
        if drawdown < worst {
            worst = drawdown;
        }
    }

    worst * 100.0
}
