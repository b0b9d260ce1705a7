//! Core domain types and logic: bars, portfolio, trades, strategies, the
//! simulation loop and performance metrics.

pub mod ohlcv;
pub mod trade;
pub mod portfolio;
pub mod strategy;
pub mod observer;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
