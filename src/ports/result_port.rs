//! Simulation result persistence port trait.

use crate::domain::backtest::SimulationResult;
use crate::domain::error::TradesimError;

/// Port for storing finished simulation results. Implementations only read
/// the result.
pub trait ResultPort {
    fn save(&self, result: &SimulationResult) -> Result<(), TradesimError>;
}
