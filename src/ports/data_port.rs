//! Market data access port trait.

use crate::domain::error::TradesimError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `symbol`, ascending by date, restricted to the
    /// inclusive range when bounds are given.
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, TradesimError>;

    fn list_symbols(&self) -> Result<Vec<String>, TradesimError>;
}
