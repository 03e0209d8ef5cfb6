//! Single-position trade simulation.
//!
//! Walks the signal series bar-by-bar as a Flat/Long state machine with
//! all-in/all-out sizing: a Buy converts the entire cash balance into units
//! at that bar's close, a Sell converts everything back. No shorting, no
//! partial sizing, no look-ahead.

use serde::Serialize;

use crate::domain::ohlcv::Bar;
use crate::domain::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PositionState {
    Flat,
    Long,
}

/// A completed round trip. Appended only when a Long position closes; an
/// end-of-run mark-to-market is never recorded as a trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedTrade {
    pub entry_index: usize,
    pub entry_price: f64,
    pub exit_index: usize,
    pub exit_price: f64,
}

impl ClosedTrade {
    pub fn is_win(&self) -> bool {
        self.exit_price > self.entry_price
    }
}

/// The open half of a trade while the position is Long.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OpenTrade {
    pub entry_index: usize,
    pub entry_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub equity: f64,
}

/// Portfolio state for one simulation run. Owned by the run; a new run gets
/// a fresh state.
///
/// Invariants: `units_held > 0` implies `position == Long` and
/// `cash_balance == 0`; `cash_balance > 0` implies `position == Flat` and
/// `units_held == 0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationState {
    pub cash_balance: f64,
    pub units_held: f64,
    pub position: PositionState,
    pub open_trade: Option<OpenTrade>,
    pub trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl SimulationState {
    fn new(initial_balance: f64) -> Self {
        SimulationState {
            cash_balance: initial_balance,
            units_held: 0.0,
            position: PositionState::Flat,
            open_trade: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    /// Equity at a given price: cash when flat, mark-to-market when long.
    pub fn equity_at(&self, price: f64) -> f64 {
        match self.position {
            PositionState::Flat => self.cash_balance,
            PositionState::Long => self.units_held * price,
        }
    }

    /// Final equity of a finished run, marking any open position to the last
    /// bar's close. Reporting only — the position stays open.
    pub fn final_equity(&self, bars: &[Bar]) -> f64 {
        match bars.last() {
            Some(last) => self.equity_at(last.close),
            None => self.cash_balance,
        }
    }
}

/// Run the state machine over aligned bars and signals.
///
/// Pure function of its inputs: same balance, bars, and signals always
/// produce the same state.
pub fn simulate(initial_balance: f64, bars: &[Bar], signals: &[Signal]) -> SimulationState {
    assert_eq!(
        bars.len(),
        signals.len(),
        "signal series must align with bars"
    );

    let mut state = SimulationState::new(initial_balance);

    for (i, bar) in bars.iter().enumerate() {
        match (state.position, signals[i]) {
            (PositionState::Flat, Signal::Buy) => {
                state.units_held = state.cash_balance / bar.close;
                state.cash_balance = 0.0;
                state.position = PositionState::Long;
                state.open_trade = Some(OpenTrade {
                    entry_index: i,
                    entry_price: bar.close,
                });
            }
            (PositionState::Long, Signal::Sell) => {
                // A Long position always carries its open trade.
                if let Some(open) = state.open_trade.take() {
                    state.cash_balance = state.units_held * bar.close;
                    state.units_held = 0.0;
                    state.position = PositionState::Flat;
                    state.trades.push(ClosedTrade {
                        entry_index: open.entry_index,
                        entry_price: open.entry_price,
                        exit_index: i,
                        exit_price: bar.close,
                    });
                }
            }
            // Flat+Sell, Long+Buy, and Hold leave the state untouched.
            _ => {}
        }

        state.equity_curve.push(EquityPoint {
            timestamp: bar.timestamp,
            equity: state.equity_at(bar.close),
        });
    }

    state
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
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1.0,
            })
            .collect()
    }

    #[test]
    fn all_hold_leaves_state_untouched() {
        let bars = make_bars(&[100.0, 110.0, 90.0]);
        let state = simulate(10_000.0, &bars, &[Signal::Hold; 3]);

        assert_eq!(state.position, PositionState::Flat);
        assert!((state.cash_balance - 10_000.0).abs() < f64::EPSILON);
        assert!((state.units_held - 0.0).abs() < f64::EPSILON);
        assert!(state.trades.is_empty());
        assert!((state.final_equity(&bars) - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn buy_goes_all_in() {
        let bars = make_bars(&[100.0, 110.0]);
        let state = simulate(10_000.0, &bars, &[Signal::Buy, Signal::Hold]);

        assert_eq!(state.position, PositionState::Long);
        assert!((state.cash_balance - 0.0).abs() < f64::EPSILON);
        assert!((state.units_held - 100.0).abs() < f64::EPSILON);
        assert!(state.trades.is_empty());
    }

    #[test]
    fn round_trip_records_one_trade() {
        let bars = make_bars(&[100.0, 105.0, 120.0, 118.0]);
        let signals = [Signal::Buy, Signal::Hold, Signal::Sell, Signal::Hold];
        let state = simulate(10_000.0, &bars, &signals);

        assert_eq!(state.position, PositionState::Flat);
        assert_eq!(state.trades.len(), 1);
        let trade = &state.trades[0];
        assert_eq!(trade.entry_index, 0);
        assert_eq!(trade.exit_index, 2);
        assert!((trade.entry_price - 100.0).abs() < f64::EPSILON);
        assert!((trade.exit_price - 120.0).abs() < f64::EPSILON);
        assert!(trade.is_win());

        // final equity = initial * exit / entry
        let expected = 10_000.0 * 120.0 / 100.0;
        assert!((state.final_equity(&bars) - expected).abs() < 1e-9);
    }

    #[test]
    fn sell_while_flat_is_ignored() {
        let bars = make_bars(&[100.0, 110.0]);
        let state = simulate(10_000.0, &bars, &[Signal::Sell, Signal::Hold]);

        assert_eq!(state.position, PositionState::Flat);
        assert!((state.cash_balance - 10_000.0).abs() < f64::EPSILON);
        assert!(state.trades.is_empty());
    }

    #[test]
    fn buy_while_long_is_ignored() {
        let bars = make_bars(&[100.0, 110.0, 120.0]);
        let signals = [Signal::Buy, Signal::Buy, Signal::Hold];
        let state = simulate(10_000.0, &bars, &signals);

        assert_eq!(state.position, PositionState::Long);
        assert_eq!(state.open_trade.unwrap().entry_index, 0);
        assert!((state.units_held - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn open_position_marks_to_market_without_a_trade() {
        let bars = make_bars(&[100.0, 110.0, 120.0]);
        let signals = [Signal::Buy, Signal::Hold, Signal::Hold];
        let state = simulate(10_000.0, &bars, &signals);

        assert_eq!(state.position, PositionState::Long);
        assert!(state.trades.is_empty());
        assert!(state.open_trade.is_some());
        assert!((state.final_equity(&bars) - 12_000.0).abs() < 1e-9);
    }

    #[test]
    fn equity_curve_tracks_every_bar() {
        let bars = make_bars(&[100.0, 110.0, 120.0, 60.0]);
        let signals = [Signal::Buy, Signal::Hold, Signal::Sell, Signal::Hold];
        let state = simulate(10_000.0, &bars, &signals);

        assert_eq!(state.equity_curve.len(), 4);
        assert!((state.equity_curve[0].equity - 10_000.0).abs() < 1e-9);
        assert!((state.equity_curve[1].equity - 11_000.0).abs() < 1e-9);
        assert!((state.equity_curve[2].equity - 12_000.0).abs() < 1e-9);
        // Flat after the sell: the crash at index 3 does not touch equity.
        assert!((state.equity_curve[3].equity - 12_000.0).abs() < 1e-9);
    }

    #[test]
    fn two_round_trips() {
        let bars = make_bars(&[100.0, 120.0, 80.0, 90.0]);
        let signals = [Signal::Buy, Signal::Sell, Signal::Buy, Signal::Sell];
        let state = simulate(10_000.0, &bars, &signals);

        assert_eq!(state.trades.len(), 2);
        assert!(state.trades[0].is_win());
        assert!(state.trades[1].is_win());
        // 10000 * 120/100 = 12000, then 12000 * 90/80 = 13500.
        assert!((state.cash_balance - 13_500.0).abs() < 1e-9);
    }

    #[test]
    fn all_in_all_out_invariant_holds_every_bar() {
        let bars = make_bars(&[100.0, 120.0, 80.0, 90.0, 95.0]);
        let signals = [
            Signal::Buy,
            Signal::Hold,
            Signal::Sell,
            Signal::Buy,
            Signal::Hold,
        ];
        let state = simulate(10_000.0, &bars, &signals);

        match state.position {
            PositionState::Long => {
                assert!(state.units_held > 0.0);
                assert!((state.cash_balance - 0.0).abs() < f64::EPSILON);
            }
            PositionState::Flat => {
                assert!((state.units_held - 0.0).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    #[should_panic(expected = "signal series must align with bars")]
    fn misaligned_signals_panic() {
        let bars = make_bars(&[100.0, 110.0]);
        simulate(10_000.0, &bars, &[Signal::Hold]);
    }
}
