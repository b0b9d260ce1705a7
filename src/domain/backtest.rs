//! Backtest engine and day-by-day simulation loop.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Instant;

use super::error::TradesimError;
use super::metrics::{PerformanceMetrics, ValuePoint};
use super::observer::SimulationObserver;
use super::ohlcv::PriceBar;
use super::portfolio::Portfolio;
use super::strategy::Strategy;
use super::trade::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub symbol: String,
    pub initial_budget: Decimal,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl BacktestConfig {
    pub fn new(symbol: &str, initial_budget: Decimal) -> Self {
        BacktestConfig {
            symbol: symbol.to_string(),
            initial_budget,
            start_date: None,
            end_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub strategy_name: String,
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_budget: Decimal,
    pub final_budget: Decimal,
    pub metrics: PerformanceMetrics,
    pub data_points_used: usize,
    pub execution_time_ms: u64,
    pub executed_at: DateTime<Utc>,
    pub trades: Vec<Trade>,
    pub value_history: Vec<ValuePoint>,
}

/// Runs `strategy` over `bars` for `config.symbol`.
///
/// `bars` must be non-empty, strictly ascending by date and all for
/// `config.symbol`, and the budget must not be negative. Any trade the
/// portfolio cannot honour, or any trade for another symbol, aborts the run;
/// no partial result is returned.
pub fn run_backtest(
    strategy: &mut dyn Strategy,
    config: &BacktestConfig,
    bars: &[PriceBar],
    observer: &mut dyn SimulationObserver,
) -> Result<SimulationResult, TradesimError> {
    let (first, last) = match (bars.first(), bars.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(TradesimError::NoMarketData {
                symbol: config.symbol.clone(),
            });
        }
    };
    check_bars(&config.symbol, bars)?;
    let mut portfolio = Portfolio::new(config.initial_budget)?;

    let started = Instant::now();
    let executed_at = Utc::now();

    strategy.initialize();
    observer.on_run_start(strategy.name(), config, bars.len());

    let mut trades: Vec<Trade> = Vec::new();
    let mut value_history: Vec<ValuePoint> = Vec::with_capacity(bars.len());
    let mut marks: HashMap<String, Decimal> = HashMap::with_capacity(1);

    for (i, bar) in bars.iter().enumerate() {
        if let Some(trade) = strategy.decide(bar, &portfolio, &bars[..=i]) {
            if trade.symbol != config.symbol {
                return Err(TradesimError::InvalidTrade {
                    reason: format!(
                        "{} trade for {} in a {} run",
                        trade.action, trade.symbol, config.symbol
                    ),
                });
            }
            portfolio = portfolio.apply(&trade)?;
            tracing::debug!(date = %bar.date, action = %trade.action, "applied trade");
            observer.on_trade(&trade, &portfolio);
            trades.push(trade);
        }

        marks.insert(config.symbol.clone(), bar.close);
        value_history.push(ValuePoint {
            date: bar.date,
            value: portfolio.total_value(&marks),
        });
    }

    strategy.finalize();

    marks.insert(config.symbol.clone(), last.close);
    let final_value = portfolio.total_value(&marks);
    let metrics =
        PerformanceMetrics::compute(config.initial_budget, final_value, &value_history, &trades);

    let result = SimulationResult {
        strategy_name: strategy.name().to_string(),
        symbol: config.symbol.clone(),
        start_date: first.date,
        end_date: last.date,
        initial_budget: config.initial_budget,
        final_budget: final_value,
        metrics,
        data_points_used: bars.len(),
        execution_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        executed_at,
        trades,
        value_history,
    };

    observer.on_run_end(&result);
    Ok(result)
}

/// Precondition check on the supplied bar sequence.
fn check_bars(symbol: &str, bars: &[PriceBar]) -> Result<(), TradesimError> {
    if let Some(bar) = bars.iter().find(|b| b.symbol != symbol) {
        return Err(TradesimError::MalformedBars {
            reason: format!("bar on {} is for {}, expected {}", bar.date, bar.symbol, symbol),
        });
    }
    if let Some(w) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
        return Err(TradesimError::MalformedBars {
            reason: format!(
                "bars not strictly ascending: {} followed by {}",
                w[0].date, w[1].date
            ),
        });
    }
    Ok(())
}
