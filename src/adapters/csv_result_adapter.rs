//! CSV result writer.
//!
//! For each result three files are written into the output directory:
//! `<strategy>_<symbol>_summary.csv`, `_trades.csv` and `_equity.csv`.

use crate::domain::backtest::SimulationResult;
use crate::domain::error::TradesimError;
use crate::ports::result_port::ResultPort;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct CsvResultAdapter {
    output_dir: PathBuf,
}

impl CsvResultAdapter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn file_stem(result: &SimulationResult) -> String {
        format!("{}_{}", result.strategy_name, result.symbol)
    }

    fn path_for(&self, result: &SimulationResult, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.csv", Self::file_stem(result), suffix))
    }
}

fn csv_error(path: &Path, e: csv::Error) -> TradesimError {
    let source = io::Error::from(e);
    TradesimError::Io(io::Error::new(
        source.kind(),
        format!("failed to write {}: {}", path.display(), source),
    ))
}

fn write_summary(path: &Path, result: &SimulationResult) -> Result<(), TradesimError> {
    let m = &result.metrics;
    let mut wtr = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    let rows: [(&str, String); 17] = [
        ("strategy_name", result.strategy_name.clone()),
        ("symbol", result.symbol.clone()),
        ("start_date", result.start_date.to_string()),
        ("end_date", result.end_date.to_string()),
        ("initial_budget", result.initial_budget.to_string()),
        ("final_budget", result.final_budget.to_string()),
        ("total_return_amount", m.total_return_amount.to_string()),
        ("total_return_percent", m.total_return_percent.round_dp(6).to_string()),
        ("max_drawdown_percent", m.max_drawdown_percent.round_dp(6).to_string()),
        ("sharpe_ratio", format!("{:.6}", m.sharpe_ratio)),
        ("winning_trades", m.winning_trade_count.to_string()),
        ("losing_trades", m.losing_trade_count.to_string()),
        ("breakeven_trades", m.breakeven_trade_count.to_string()),
        ("realized_pnl", m.realized_pnl.to_string()),
        ("data_points_used", result.data_points_used.to_string()),
        ("execution_time_ms", result.execution_time_ms.to_string()),
        ("executed_at", result.executed_at.to_rfc3339()),
    ];

    wtr.write_record(["field", "value"])
        .map_err(|e| csv_error(path, e))?;
    for (field, value) in &rows {
        wtr.write_record([*field, value.as_str()])
            .map_err(|e| csv_error(path, e))?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_trades(path: &Path, result: &SimulationResult) -> Result<(), TradesimError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    wtr.write_record(["date", "action", "symbol", "shares", "price", "notional", "note"])
        .map_err(|e| csv_error(path, e))?;
    for trade in &result.trades {
        wtr.write_record([
            trade.date.to_string(),
            trade.action.to_string(),
            trade.symbol.clone(),
            trade.shares.to_string(),
            trade.price.to_string(),
            trade.notional().to_string(),
            trade.note.clone().unwrap_or_default(),
        ])
        .map_err(|e| csv_error(path, e))?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_equity(path: &Path, result: &SimulationResult) -> Result<(), TradesimError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
    wtr.write_record(["date", "value"])
        .map_err(|e| csv_error(path, e))?;
    for point in &result.value_history {
        wtr.write_record([point.date.to_string(), point.value.to_string()])
            .map_err(|e| csv_error(path, e))?;
    }
    wtr.flush()?;
    Ok(())
}

impl ResultPort for CsvResultAdapter {
    fn save(&self, result: &SimulationResult) -> Result<(), TradesimError> {
        fs::create_dir_all(&self.output_dir)?;

        let summary = self.path_for(result, "summary");
        write_summary(&summary, result)?;
        write_trades(&self.path_for(result, "trades"), result)?;
        write_equity(&self.path_for(result, "equity"), result)?;

        tracing::info!(path = %summary.display(), "results written");
        Ok(())
    }
}
