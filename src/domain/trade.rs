//! Executed trade records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub date: NaiveDate,
    pub action: TradeAction,
    pub symbol: String,
    pub shares: Decimal,
    pub price: Decimal,
    pub note: Option<String>,
}

impl Trade {
    pub fn buy(date: NaiveDate, symbol: &str, shares: Decimal, price: Decimal) -> Self {
        Trade {
            date,
            action: TradeAction::Buy,
            symbol: symbol.to_string(),
            shares,
            price,
            note: None,
        }
    }

    pub fn sell(date: NaiveDate, symbol: &str, shares: Decimal, price: Decimal) -> Self {
        Trade {
            date,
            action: TradeAction::Sell,
            symbol: symbol.to_string(),
            shares,
            price,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// shares * price
    pub fn notional(&self) -> Decimal {
        self.shares * self.price
    }

    pub fn is_buy(&self) -> bool {
        self.action == TradeAction::Buy
    }
}
