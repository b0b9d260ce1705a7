//! Daily OHLCV price bar.

use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub symbol: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub adjusted_close: Decimal,
    pub volume: u64,
}

impl PriceBar {
    /// high >= max(open, close) and low <= min(open, close)
    pub fn is_consistent(&self) -> bool {
        self.high >= self.open.max(self.close) && self.low <= self.open.min(self.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_bar() -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            symbol: "AAPL".into(),
            open: dec!(100),
            high: dec!(110),
            low: dec!(90),
            close: dec!(105),
            adjusted_close: dec!(104.5),
            volume: 50_000,
        }
    }

    #[test]
    fn consistent_bar() {
        assert!(sample_bar().is_consistent());
    }

    #[test]
    fn high_below_close_is_inconsistent() {
        let bar = PriceBar {
            high: dec!(104),
            ..sample_bar()
        };
        assert!(!bar.is_consistent());
    }

    #[test]
    fn low_above_open_is_inconsistent() {
        let bar = PriceBar {
            low: dec!(101),
            ..sample_bar()
        };
        assert!(!bar.is_consistent());
    }
}
