//! Event sink for simulation progress.
//!
//! The engine never prints; it reports run start, executed trades and the
//! finished result to a `SimulationObserver` supplied by the caller.

use rust_decimal::Decimal;

use super::backtest::{BacktestConfig, SimulationResult};
use super::portfolio::Portfolio;
use super::trade::Trade;

pub trait SimulationObserver {
    fn on_run_start(&mut self, _strategy: &str, _config: &BacktestConfig, _bar_count: usize) {}

    fn on_trade(&mut self, _trade: &Trade, _portfolio: &Portfolio) {}

    fn on_run_end(&mut self, _result: &SimulationResult) {}
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl SimulationObserver for NoopObserver {}

/// Emits structured `tracing` events.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl SimulationObserver for TracingObserver {
    fn on_run_start(&mut self, strategy: &str, config: &BacktestConfig, bar_count: usize) {
        tracing::info!(
            strategy,
            symbol = %config.symbol,
            budget = %config.initial_budget,
            bars = bar_count,
            "simulation started"
        );
    }

    fn on_trade(&mut self, trade: &Trade, portfolio: &Portfolio) {
        tracing::info!(
            date = %trade.date,
            action = %trade.action,
            symbol = %trade.symbol,
            shares = %trade.shares,
            price = %trade.price,
            cash = %portfolio.cash(),
            "trade executed"
        );
    }

    fn on_run_end(&mut self, result: &SimulationResult) {
        let m = &result.metrics;
        tracing::info!(
            strategy = %result.strategy_name,
            symbol = %result.symbol,
            final_value = %result.final_budget,
            total_return_pct = %m.total_return_percent.round_dp(2),
            max_drawdown_pct = %m.max_drawdown_percent.round_dp(2),
            sharpe = m.sharpe_ratio,
            trades = result.trades.len(),
            elapsed_ms = result.execution_time_ms,
            "simulation finished"
        );
    }
}

/// Records events in memory. Useful for tests and embedding callers.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub started: Vec<(String, usize)>,
    pub trades: Vec<Trade>,
    pub cash_after_trade: Vec<Decimal>,
    pub finished: usize,
}

impl SimulationObserver for RecordingObserver {
    fn on_run_start(&mut self, strategy: &str, _config: &BacktestConfig, bar_count: usize) {
        self.started.push((strategy.to_string(), bar_count));
    }

    fn on_trade(&mut self, trade: &Trade, portfolio: &Portfolio) {
        self.trades.push(trade.clone());
        self.cash_after_trade.push(portfolio.cash());
    }

    fn on_run_end(&mut self, _result: &SimulationResult) {
        self.finished += 1;
    }
}
