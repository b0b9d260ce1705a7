#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cell::RefCell;
use std::collections::HashMap;
use tradesim::domain::backtest::{BacktestConfig, SimulationResult};
use tradesim::domain::error::TradesimError;
pub use tradesim::domain::ohlcv::PriceBar;
use tradesim::ports::data_port::DataPort;
use tradesim::ports::result_port::ResultPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, TradesimError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TradesimError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| start_date.is_none_or(|s| b.date >= s))
                    .filter(|b| end_date.is_none_or(|e| b.date <= e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, TradesimError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Keeps every saved result in memory.
#[derive(Default)]
pub struct MemoryResultPort {
    pub saved: RefCell<Vec<SimulationResult>>,
}

impl ResultPort for MemoryResultPort {
    fn save(&self, result: &SimulationResult) -> Result<(), TradesimError> {
        self.saved.borrow_mut().push(result.clone());
        Ok(())
    }
}

pub fn make_bar(symbol: &str, date: &str, close: Decimal) -> PriceBar {
    PriceBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        symbol: symbol.to_string(),
        open: close,
        high: close + Decimal::ONE,
        low: close - Decimal::ONE,
        close,
        adjusted_close: close,
        volume: 1000,
    }
}

/// One bar per consecutive day, closing at each of `closes`.
pub fn bars_from_closes(symbol: &str, start_date: &str, closes: &[Decimal]) -> Vec<PriceBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            symbol: symbol.to_string(),
            open: close,
            high: close,
            low: close,
            close,
            adjusted_close: close,
            volume: 1000,
        })
        .collect()
}

/// `count` bars rising by one per day from `start_price`.
pub fn generate_bars(
    symbol: &str,
    start_date: &str,
    count: usize,
    start_price: Decimal,
) -> Vec<PriceBar> {
    let closes: Vec<Decimal> = (0..count)
        .map(|i| start_price + Decimal::from(i as u64))
        .collect();
    bars_from_closes(symbol, start_date, &closes)
}

pub fn sample_config(symbol: &str, budget: Decimal) -> BacktestConfig {
    BacktestConfig::new(symbol, budget)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
