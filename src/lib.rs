//! sigtrader — signal-driven OHLCV backtest engine.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in
//! [`ports`], concrete implementations in [`adapters`].
//!
//! The core is a strict, synchronous pipeline over an immutable bar series:
//! indicators -> signals -> single-position simulation -> performance report.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
