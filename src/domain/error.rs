//! Domain error types.

use rust_decimal::Decimal;

/// Top-level error type for tradesim.
#[derive(Debug, thiserror::Error)]
pub enum TradesimError {
    #[error("no market data for {symbol}")]
    NoMarketData { symbol: String },

    #[error("insufficient funds to buy {symbol}: need {required}, have {available}")]
    InsufficientFunds {
        symbol: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("insufficient shares to sell {symbol}: requested {requested}, held {held}")]
    InsufficientShares {
        symbol: String,
        requested: Decimal,
        held: Decimal,
    },

    #[error("initial budget must be non-negative, got {budget}")]
    InvalidBudget { budget: Decimal },

    #[error("invalid trade: {reason}")]
    InvalidTrade { reason: String },

    #[error("malformed bars: {reason}")]
    MalformedBars { reason: String },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradesimError {
    /// True for the errors that abort a simulation run mid-loop.
    pub fn is_simulation_failure(&self) -> bool {
        matches!(
            self,
            TradesimError::InsufficientFunds { .. }
                | TradesimError::InsufficientShares { .. }
                | TradesimError::InvalidTrade { .. }
        )
    }
}

impl From<&TradesimError> for std::process::ExitCode {
    fn from(err: &TradesimError) -> Self {
        let code: u8 = match err {
            TradesimError::Io(_) => 1,
            TradesimError::ConfigParse { .. }
            | TradesimError::ConfigMissing { .. }
            | TradesimError::ConfigInvalid { .. }
            | TradesimError::InvalidBudget { .. } => 2,
            TradesimError::UnknownStrategy { .. } => 4,
            TradesimError::NoMarketData { .. }
            | TradesimError::MalformedBars { .. }
            | TradesimError::DataSource { .. } => 5,
            TradesimError::InsufficientFunds { .. }
            | TradesimError::InsufficientShares { .. }
            | TradesimError::InvalidTrade { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
