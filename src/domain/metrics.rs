//! Performance metrics and statistics.
//!
//! Returns and drawdown stay in exact decimal. The Sharpe ratio is a
//! statistical estimate and is computed in `f64`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::{HashMap, VecDeque};

use super::trade::{Trade, TradeAction};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// One sample of the per-day portfolio value history.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceMetrics {
    pub total_return_percent: Decimal,
    pub total_return_amount: Decimal,
    pub max_drawdown_percent: Decimal,
    pub sharpe_ratio: f64,
    pub winning_trade_count: usize,
    pub losing_trade_count: usize,
    pub breakeven_trade_count: usize,
    pub realized_pnl: Decimal,
}

impl PerformanceMetrics {
    pub fn compute(
        initial_budget: Decimal,
        final_value: Decimal,
        value_history: &[ValuePoint],
        trades: &[Trade],
    ) -> Self {
        let total_return_amount = final_value - initial_budget;
        let total_return_percent = if initial_budget.is_zero() {
            Decimal::ZERO
        } else {
            total_return_amount / initial_budget * Decimal::ONE_HUNDRED
        };

        let outcomes = match_lots_fifo(trades);
        let winning_trade_count = outcomes.iter().filter(|o| o.pnl > Decimal::ZERO).count();
        let losing_trade_count = outcomes.iter().filter(|o| o.pnl < Decimal::ZERO).count();
        let breakeven_trade_count = outcomes.len() - winning_trade_count - losing_trade_count;
        let realized_pnl = outcomes.iter().map(|o| o.pnl).sum();

        PerformanceMetrics {
            total_return_percent,
            total_return_amount,
            max_drawdown_percent: compute_max_drawdown(initial_budget, value_history),
            sharpe_ratio: compute_sharpe(value_history),
            winning_trade_count,
            losing_trade_count,
            breakeven_trade_count,
            realized_pnl,
        }
    }
}

/// Largest peak-to-value decline, in percent, with the peak tracked
/// chronologically from `initial_budget`.
pub fn compute_max_drawdown(initial_budget: Decimal, value_history: &[ValuePoint]) -> Decimal {
    let mut peak = initial_budget;
    let mut max_dd = Decimal::ZERO;

    for point in value_history {
        if point.value > peak {
            peak = point.value;
        }
        if peak > Decimal::ZERO {
            let dd = (peak - point.value) / peak * Decimal::ONE_HUNDRED;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// Annualized Sharpe ratio of daily returns with a zero risk-free rate.
pub fn compute_sharpe(value_history: &[ValuePoint]) -> f64 {
    if value_history.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = value_history
        .windows(2)
        .map(|w| {
            let prev = w[0].value;
            let curr = w[1].value;
            if prev.is_zero() {
                0.0
            } else {
                ((curr - prev) / prev).to_f64().unwrap_or(0.0)
            }
        })
        .collect();

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        mean / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}

/// Realized result of one sell after matching it against open buy lots.
#[derive(Debug, Clone, PartialEq)]
pub struct SellOutcome {
    pub date: NaiveDate,
    pub symbol: String,
    pub matched_shares: Decimal,
    pub pnl: Decimal,
}

struct Lot {
    shares: Decimal,
    price: Decimal,
}

/// Matches every sell against the oldest open buy lots of its symbol.
///
/// Shares sold beyond the open lots are left unmatched and contribute no P&L.
pub fn match_lots_fifo(trades: &[Trade]) -> Vec<SellOutcome> {
    let mut open_lots: HashMap<&str, VecDeque<Lot>> = HashMap::new();
    let mut outcomes = Vec::new();

    for trade in trades {
        match trade.action {
            TradeAction::Buy => {
                open_lots.entry(trade.symbol.as_str()).or_default().push_back(Lot {
                    shares: trade.shares,
                    price: trade.price,
                });
            }
            TradeAction::Sell => {
                let lots = open_lots.entry(trade.symbol.as_str()).or_default();
                let mut remaining = trade.shares;
                let mut matched = Decimal::ZERO;
                let mut pnl = Decimal::ZERO;

                while remaining > Decimal::ZERO {
                    let Some(lot) = lots.front_mut() else {
                        break;
                    };
                    let take = remaining.min(lot.shares);
                    pnl += take * (trade.price - lot.price);
                    matched += take;
                    remaining -= take;
                    lot.shares -= take;
                    if lot.shares.is_zero() {
                        lots.pop_front();
                    }
                }

                outcomes.push(SellOutcome {
                    date: trade.date,
                    symbol: trade.symbol.clone(),
                    matched_shares: matched,
                    pnl,
                });
            }
        }
    }

    outcomes
}
