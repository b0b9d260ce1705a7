//! Configuration validation.
//!
//! Validates all config fields before a backtest runs.

use crate::domain::error::TradesimError;
use crate::domain::strategy;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    validate_symbol(config)?;
    validate_initial_budget(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    strategy::from_config(config).map(|_| ())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    match config.get_string("backtest", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(TradesimError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_initial_budget(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    match config.get_decimal("backtest", "initial_budget")? {
        None => Err(TradesimError::ConfigMissing {
            section: "backtest".to_string(),
            key: "initial_budget".to_string(),
        }),
        Some(value) if value <= Decimal::ZERO => Err(TradesimError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_budget".to_string(),
            reason: "initial_budget must be positive".to_string(),
        }),
        Some(_) => Ok(()),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), TradesimError> {
    let start_date = parse_optional_date(config, "start_date")?;
    let end_date = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err(TradesimError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must not be after end_date".to_string(),
            });
        }
    }
    Ok(())
}

/// Reads an optional `YYYY-MM-DD` date from `[backtest]`.
pub fn parse_optional_date(
    config: &dyn ConfigPort,
    field: &str,
) -> Result<Option<NaiveDate>, TradesimError> {
    match config.get_string("backtest", field) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| TradesimError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_backtest_config_passes() {
        let config = make_config(
            r#"
[backtest]
symbol = AAPL
initial_budget = 10000
start_date = 2020-01-01
end_date = 2024-12-31
"#,
        );
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn dates_are_optional() {
        let config = make_config("[backtest]\nsymbol = AAPL\ninitial_budget = 500.25\n");
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn missing_symbol() {
        let config = make_config("[backtest]\ninitial_budget = 10000\n");
        assert!(matches!(
            validate_backtest_config(&config),
            Err(TradesimError::ConfigMissing { key, .. }) if key == "symbol"
        ));
    }

    #[test]
    fn missing_budget() {
        let config = make_config("[backtest]\nsymbol = AAPL\n");
        assert!(matches!(
            validate_backtest_config(&config),
            Err(TradesimError::ConfigMissing { key, .. }) if key == "initial_budget"
        ));
    }

    #[test]
    fn non_positive_budget() {
        let config = make_config("[backtest]\nsymbol = AAPL\ninitial_budget = 0\n");
        assert!(matches!(
            validate_backtest_config(&config),
            Err(TradesimError::ConfigInvalid { key, .. }) if key == "initial_budget"
        ));
    }

    #[test]
    fn non_numeric_budget() {
        let config = make_config("[backtest]\nsymbol = AAPL\ninitial_budget = lots\n");
        assert!(matches!(
            validate_backtest_config(&config),
            Err(TradesimError::ConfigInvalid { key, .. }) if key == "initial_budget"
        ));
    }

    #[test]
    fn bad_date_format() {
        let config = make_config(
            "[backtest]\nsymbol = AAPL\ninitial_budget = 100\nstart_date = 01/02/2020\n",
        );
        assert!(matches!(
            validate_backtest_config(&config),
            Err(TradesimError::ConfigInvalid { key, .. }) if key == "start_date"
        ));
    }

    #[test]
    fn inverted_date_range() {
        let config = make_config(
            "[backtest]\nsymbol = AAPL\ninitial_budget = 100\nstart_date = 2024-01-02\nend_date = 2024-01-01\n",
        );
        assert!(validate_backtest_config(&config).is_err());
    }

    #[test]
    fn single_day_range_allowed() {
        let config = make_config(
            "[backtest]\nsymbol = AAPL\ninitial_budget = 100\nstart_date = 2024-01-02\nend_date = 2024-01-02\n",
        );
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn strategy_config_rejects_unknown_name() {
        let config = make_config("[strategy]\nname = grid\n");
        assert!(matches!(
            validate_strategy_config(&config),
            Err(TradesimError::UnknownStrategy { .. })
        ));
    }

    #[test]
    fn strategy_config_rejects_inverted_periods() {
        let config =
            make_config("[strategy]\nname = sma_crossover\nfast_period = 30\nslow_period = 10\n");
        assert!(matches!(
            validate_strategy_config(&config),
            Err(TradesimError::ConfigInvalid { .. })
        ));
    }
}
