//! Immutable cash + position state.
//!
//! Every transition returns a new `Portfolio`; nothing is mutated in place.

use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use super::error::TradesimError;
use super::trade::{Trade, TradeAction};

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    cash: Decimal,
    positions: BTreeMap<String, Decimal>,
}

impl Portfolio {
    /// Starting portfolio holding only `cash`, which must not be negative.
    pub fn new(cash: Decimal) -> Result<Self, TradesimError> {
        if cash < Decimal::ZERO {
            return Err(TradesimError::InvalidBudget { budget: cash });
        }
        Ok(Portfolio {
            cash,
            positions: BTreeMap::new(),
        })
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn positions(&self) -> &BTreeMap<String, Decimal> {
        &self.positions
    }

    pub fn shares_of(&self, symbol: &str) -> Decimal {
        self.positions.get(symbol).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    /// Cash plus marked positions. Positions without a price contribute zero.
    pub fn total_value(&self, prices: &HashMap<String, Decimal>) -> Decimal {
        let position_value: Decimal = self
            .positions
            .iter()
            .filter_map(|(symbol, shares)| prices.get(symbol).map(|&price| *shares * price))
            .sum();
        self.cash + position_value
    }

    pub fn buy(&self, symbol: &str, shares: Decimal, price: Decimal) -> Result<Self, TradesimError> {
        validate_order(symbol, shares, price)?;

        let cost = shares * price;
        if cost > self.cash {
            return Err(TradesimError::InsufficientFunds {
                symbol: symbol.to_string(),
                required: cost,
                available: self.cash,
            });
        }

        let mut positions = self.positions.clone();
        *positions.entry(symbol.to_string()).or_insert(Decimal::ZERO) += shares;

        Ok(Portfolio {
            cash: self.cash - cost,
            positions,
        })
    }

    pub fn sell(&self, symbol: &str, shares: Decimal, price: Decimal) -> Result<Self, TradesimError> {
        validate_order(symbol, shares, price)?;

        let held = self.shares_of(symbol);
        if held < shares {
            return Err(TradesimError::InsufficientShares {
                symbol: symbol.to_string(),
                requested: shares,
                held,
            });
        }

        let mut positions = self.positions.clone();
        let remaining = held - shares;
        if remaining.is_zero() {
            positions.remove(symbol);
        } else {
            positions.insert(symbol.to_string(), remaining);
        }

        Ok(Portfolio {
            cash: self.cash + shares * price,
            positions,
        })
    }

    /// Applies a trade record as the matching buy or sell.
    pub fn apply(&self, trade: &Trade) -> Result<Self, TradesimError> {
        match trade.action {
            TradeAction::Buy => self.buy(&trade.symbol, trade.shares, trade.price),
            TradeAction::Sell => self.sell(&trade.symbol, trade.shares, trade.price),
        }
    }
}

fn validate_order(symbol: &str, shares: Decimal, price: Decimal) -> Result<(), TradesimError> {
    if shares <= Decimal::ZERO {
        return Err(TradesimError::InvalidTrade {
            reason: format!("{symbol}: share quantity must be positive, got {shares}"),
        });
    }
    if price < Decimal::ZERO {
        return Err(TradesimError::InvalidTrade {
            reason: format!("{symbol}: price must be non-negative, got {price}"),
        });
    }
    Ok(())
}
