//! SignalDesk Core: domain types, mock generators and the pure logic of the
//! trading-signals dashboard.
//!
//! - Domain records (rows, templates, traders, positions, history, alerts)
//! - Static catalogs (timeframes, instruments, top traders, brokers)
//! - Signal aggregation: probability, selected-timeframe majority, accuracy
//! - The signal board with its duplicate-entry guard
//! - Mock backtest engine and summary statistics
//! - Mock OHLCV bars, copied trades and price ticks
//!
//! Everything random takes an explicit `Rng`, so callers choose between OS
//! entropy and the seeded [`rng::RngHierarchy`].

pub mod alerts;
pub mod backtest;
pub mod board;
pub mod catalog;
pub mod chart;
pub mod copy_trading;
pub mod domain;
pub mod history;
pub mod numeric;
pub mod ohlcv;
pub mod portfolio;
pub mod rng;
pub mod signals;
