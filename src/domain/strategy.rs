//! Strategy abstraction and the shipped decision policies.
//!
//! A strategy sees one bar per trading day, in chronological order, together
//! with the current portfolio and every bar seen so far (current bar
//! included). It answers with at most one trade for that day.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::error::TradesimError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::portfolio::Portfolio;
use crate::domain::trade::Trade;
use crate::ports::config_port::ConfigPort;

/// Share quantities are floored to this many decimal places.
pub const SHARE_DECIMALS: u32 = 8;

/// Used when `[strategy] name` is absent.
pub const DEFAULT_STRATEGY: &str = "hold_to_end";

pub trait Strategy {
    fn name(&self) -> &str;

    /// Resets all accumulated state. Called before every run.
    fn initialize(&mut self) {}

    fn decide(
        &mut self,
        bar: &PriceBar,
        portfolio: &Portfolio,
        history: &[PriceBar],
    ) -> Option<Trade>;

    /// Called once after the last bar.
    fn finalize(&mut self) {}
}

/// floor(cash / price) at [`SHARE_DECIMALS`] places; zero for a non-positive price.
pub fn affordable_shares(cash: Decimal, price: Decimal) -> Decimal {
    if price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    cash.checked_div(price)
        .map(|q| q.round_dp_with_strategy(SHARE_DECIMALS, RoundingStrategy::ToZero))
        .unwrap_or(Decimal::ZERO)
}

/// Buys with all available cash on the first day it can, then holds.
#[derive(Debug, Default)]
pub struct HoldToEnd {
    entered: bool,
}

impl HoldToEnd {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for HoldToEnd {
    fn name(&self) -> &str {
        "hold_to_end"
    }

    fn initialize(&mut self) {
        self.entered = false;
    }

    fn decide(
        &mut self,
        bar: &PriceBar,
        portfolio: &Portfolio,
        _history: &[PriceBar],
    ) -> Option<Trade> {
        if self.entered || portfolio.has_position(&bar.symbol) {
            return None;
        }

        let shares = affordable_shares(portfolio.cash(), bar.close);
        if shares <= Decimal::ZERO {
            return None;
        }

        self.entered = true;
        Some(
            Trade::buy(bar.date, &bar.symbol, shares, bar.close).with_note("initial allocation"),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmaCrossoverSettings {
    pub fast_period: usize,
    pub slow_period: usize,
}

/// Goes all in when the fast SMA crosses above the slow SMA and exits the
/// whole position when it crosses back below.
#[derive(Debug)]
pub struct SmaCrossover {
    settings: SmaCrossoverSettings,
    previous: Option<(Decimal, Decimal)>,
}

impl SmaCrossover {
    pub fn new(settings: SmaCrossoverSettings) -> Result<Self, TradesimError> {
        if settings.fast_period == 0 {
            return Err(TradesimError::ConfigInvalid {
                section: "strategy".into(),
                key: "fast_period".into(),
                reason: "fast_period must be positive".into(),
            });
        }
        if settings.fast_period >= settings.slow_period {
            return Err(TradesimError::ConfigInvalid {
                section: "strategy".into(),
                key: "slow_period".into(),
                reason: "slow_period must be greater than fast_period".into(),
            });
        }
        Ok(Self {
            settings,
            previous: None,
        })
    }
}

/// Mean close of the last `period` bars, or `None` during warmup.
pub fn sma(history: &[PriceBar], period: usize) -> Option<Decimal> {
    if period == 0 || history.len() < period {
        return None;
    }
    let sum: Decimal = history[history.len() - period..].iter().map(|b| b.close).sum();
    Some(sum / Decimal::from(period))
}

impl Strategy for SmaCrossover {
    fn name(&self) -> &str {
        "sma_crossover"
    }

    fn initialize(&mut self) {
        self.previous = None;
    }

    fn decide(
        &mut self,
        bar: &PriceBar,
        portfolio: &Portfolio,
        history: &[PriceBar],
    ) -> Option<Trade> {
        let fast = sma(history, self.settings.fast_period)?;
        let slow = sma(history, self.settings.slow_period)?;
        let previous = self.previous.replace((fast, slow));
        let (prev_fast, prev_slow) = previous?;

        let crossed_above = prev_fast <= prev_slow && fast > slow;
        let crossed_below = prev_fast >= prev_slow && fast < slow;
        let held = portfolio.shares_of(&bar.symbol);

        if crossed_above && held.is_zero() {
            let shares = affordable_shares(portfolio.cash(), bar.close);
            if shares > Decimal::ZERO {
                return Some(
                    Trade::buy(bar.date, &bar.symbol, shares, bar.close)
                        .with_note("fast sma crossed above slow"),
                );
            }
        } else if crossed_below && held > Decimal::ZERO {
            return Some(
                Trade::sell(bar.date, &bar.symbol, held, bar.close)
                    .with_note("fast sma crossed below slow"),
            );
        }
        None
    }
}

/// Builds the strategy named in `[strategy] name`.
pub fn from_config(config: &dyn ConfigPort) -> Result<Box<dyn Strategy>, TradesimError> {
    let name = config
        .get_string("strategy", "name")
        .unwrap_or_else(|| DEFAULT_STRATEGY.to_string());

    match name.trim() {
        "hold_to_end" | "buy_and_hold" => Ok(Box::new(HoldToEnd::new())),
        "sma_crossover" => {
            let settings = SmaCrossoverSettings {
                fast_period: period_setting(config, "fast_period", 10)?,
                slow_period: period_setting(config, "slow_period", 30)?,
            };
            Ok(Box::new(SmaCrossover::new(settings)?))
        }
        unknown => Err(TradesimError::UnknownStrategy {
            name: unknown.to_string(),
        }),
    }
}

fn period_setting(
    config: &dyn ConfigPort,
    key: &str,
    default: i64,
) -> Result<usize, TradesimError> {
    let value = config.get_int("strategy", key, default);
    usize::try_from(value).map_err(|_| TradesimError::ConfigInvalid {
        section: "strategy".into(),
        key: key.into(),
        reason: format!("{key} must be non-negative"),
    })
}
