//! Configuration access port trait.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::domain::error::TradesimError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// Exact decimal lookup. `Ok(None)` when the key is absent.
    fn get_decimal(&self, section: &str, key: &str) -> Result<Option<Decimal>, TradesimError> {
        match self.get_string(section, key) {
            None => Ok(None),
            Some(raw) => Decimal::from_str(raw.trim())
                .map(Some)
                .map_err(|e| TradesimError::ConfigInvalid {
                    section: section.to_string(),
                    key: key.to_string(),
                    reason: format!("not a decimal number: {e}"),
                }),
        }
    }
}
