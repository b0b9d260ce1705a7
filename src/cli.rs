//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::prelude::*;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_result_adapter::CsvResultAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, SimulationResult};
use crate::domain::config_validation::{
    parse_optional_date, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::TradesimError;
use crate::domain::observer::{SimulationObserver, TracingObserver};
use crate::domain::strategy::{self, Strategy};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::result_port::ResultPort;

#[derive(Parser, Debug)]
#[command(name = "tradesim", about = "Single-symbol daily strategy backtester")]
pub struct Cli {
    /// Log engine events at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        strategy: Option<String>,
        #[arg(short, long)]
        budget: Option<String>,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without running it
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in a data directory
    ListSymbols {
        #[arg(short, long)]
        data_dir: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing(cli.verbose);

    match cli.command {
        Command::Backtest {
            config,
            symbol,
            strategy,
            budget,
            data_dir,
            output,
        } => {
            let overrides = Overrides {
                symbol,
                strategy,
                budget,
                data_dir,
                output,
            };
            run_backtest(&config, &overrides)
        }
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { data_dir } => run_list_symbols(&data_dir),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(tracing_subscriber::filter::Targets::new().with_default(level));
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub symbol: Option<String>,
    pub strategy: Option<String>,
    pub budget: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl Overrides {
    pub fn apply(&self, adapter: &mut FileConfigAdapter) {
        if let Some(symbol) = &self.symbol {
            adapter.set("backtest", "symbol", symbol);
        }
        if let Some(name) = &self.strategy {
            adapter.set("strategy", "name", name);
        }
        if let Some(budget) = &self.budget {
            adapter.set("backtest", "initial_budget", budget);
        }
        if let Some(dir) = &self.data_dir {
            adapter.set("backtest", "data_dir", &dir.display().to_string());
        }
        if let Some(dir) = &self.output {
            adapter.set("backtest", "output_dir", &dir.display().to_string());
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn run_backtest(config_path: &Path, overrides: &Overrides) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let mut adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    overrides.apply(&mut adapter);

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let mut strategy = match strategy::from_config(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Loading strategy: {}", strategy.name());

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let data_dir = adapter
        .get_string("backtest", "data_dir")
        .unwrap_or_else(|| "data".to_string());
    let output_dir = adapter
        .get_string("backtest", "output_dir")
        .unwrap_or_else(|| "results".to_string());

    let data_port = CsvAdapter::new(PathBuf::from(data_dir));
    let result_port = CsvResultAdapter::new(PathBuf::from(&output_dir));
    let mut observer = TracingObserver;

    match run_backtest_pipeline(
        &data_port,
        &result_port,
        strategy.as_mut(),
        &bt_config,
        &mut observer,
    ) {
        Ok(result) => {
            print_summary(&result);
            eprintln!("\nResults written to: {}", output_dir);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Builds the engine config from `[backtest]`. Assumes the section has
/// already passed `validate_backtest_config`, but still reports missing keys.
pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, TradesimError> {
    let symbol = adapter
        .get_string("backtest", "symbol")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TradesimError::ConfigMissing {
            section: "backtest".into(),
            key: "symbol".into(),
        })?;
    let initial_budget: Decimal =
        adapter
            .get_decimal("backtest", "initial_budget")?
            .ok_or_else(|| TradesimError::ConfigMissing {
                section: "backtest".into(),
                key: "initial_budget".into(),
            })?;

    Ok(BacktestConfig {
        symbol,
        initial_budget,
        start_date: parse_optional_date(adapter, "start_date")?,
        end_date: parse_optional_date(adapter, "end_date")?,
    })
}

/// Fetch, simulate, persist. The result is only handed to the result port
/// once the run has completed.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    result_port: &dyn ResultPort,
    strategy: &mut dyn Strategy,
    bt_config: &BacktestConfig,
    observer: &mut dyn SimulationObserver,
) -> Result<SimulationResult, TradesimError> {
    let bars = data_port.fetch_bars(&bt_config.symbol, bt_config.start_date, bt_config.end_date)?;
    tracing::debug!(symbol = %bt_config.symbol, bars = bars.len(), "market data loaded");

    let result = backtest_engine::run_backtest(strategy, bt_config, &bars, observer)?;
    result_port.save(&result)?;
    Ok(result)
}

fn print_summary(result: &SimulationResult) {
    let m = &result.metrics;
    eprintln!("\n=== {} on {} ===", result.strategy_name, result.symbol);
    eprintln!("Period:           {} to {}", result.start_date, result.end_date);
    eprintln!("Trading days:     {}", result.data_points_used);
    eprintln!("Initial budget:   {:.2}", result.initial_budget);
    eprintln!("Final value:      {:.2}", result.final_budget);
    eprintln!("Total Return:     {:.2}%", m.total_return_percent);
    eprintln!("Max Drawdown:     {}", format_drawdown(m.max_drawdown_percent));
    eprintln!("Sharpe Ratio:     {:.2}", m.sharpe_ratio);
    eprintln!("Total Trades:     {}", result.trades.len());
    eprintln!(
        "Closed (W/L/E):   {}/{}/{}",
        m.winning_trade_count, m.losing_trade_count, m.breakeven_trade_count
    );
    eprintln!("Realized P&L:     {:.2}", m.realized_pnl);
}

/// Drawdown as a loss, e.g. `-9.52%`; an unsigned `0.00%` when there was none.
fn format_drawdown(percent: Decimal) -> String {
    let rounded = percent.round_dp(2);
    if rounded.is_zero() {
        "0.00%".to_string()
    } else {
        format!("-{:.2}%", rounded)
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let name = adapter
        .get_string("strategy", "name")
        .unwrap_or_else(|| strategy::DEFAULT_STRATEGY.to_string());
    eprintln!("  strategy: {}", name);
    if let Some(symbol) = adapter.get_string("backtest", "symbol") {
        eprintln!("  symbol:   {}", symbol);
    }

    eprintln!("Config is valid");
    ExitCode::SUCCESS
}

fn run_list_symbols(data_dir: &Path) -> ExitCode {
    let adapter = CsvAdapter::new(data_dir.to_path_buf());

    let symbols = match adapter.list_symbols() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if symbols.is_empty() {
        eprintln!("No symbols found in {}", data_dir.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn cli_parses_backtest_overrides() {
        let cli = Cli::try_parse_from([
            "tradesim", "backtest", "-c", "run.ini", "--symbol", "MSFT", "-b", "2500",
        ])
        .unwrap();
        match cli.command {
            Command::Backtest {
                config,
                symbol,
                budget,
                strategy,
                ..
            } => {
                assert_eq!(config, PathBuf::from("run.ini"));
                assert_eq!(symbol.as_deref(), Some("MSFT"));
                assert_eq!(budget.as_deref(), Some("2500"));
                assert!(strategy.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn cli_verbose_is_global() {
        let cli = Cli::try_parse_from(["tradesim", "list-symbols", "-d", "data", "--verbose"])
            .unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn drawdown_sign_only_when_nonzero() {
        assert_eq!(format_drawdown(Decimal::ZERO), "0.00%");
        assert_eq!(format_drawdown(dec!(0.001)), "0.00%");
        assert_eq!(format_drawdown(dec!(9.5238095)), "-9.52%");
    }

    #[test]
    fn overrides_replace_config_values() {
        let mut adapter =
            FileConfigAdapter::from_string("[backtest]\nsymbol = AAPL\ninitial_budget = 100\n")
                .unwrap();
        let overrides = Overrides {
            symbol: Some("MSFT".into()),
            budget: Some("250.5".into()),
            ..Default::default()
        };
        overrides.apply(&mut adapter);

        let config = build_backtest_config(&adapter).unwrap();
        assert_eq!(config.symbol, "MSFT");
        assert_eq!(config.initial_budget, dec!(250.5));
    }

    #[test]
    fn build_backtest_config_reads_dates() {
        let adapter = FileConfigAdapter::from_string(
            "[backtest]\nsymbol = AAPL\ninitial_budget = 1000\nstart_date = 2024-01-01\n",
        )
        .unwrap();
        let config = build_backtest_config(&adapter).unwrap();
        assert_eq!(
            config.start_date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(config.end_date, None);
    }

    #[test]
    fn build_backtest_config_requires_budget() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nsymbol = AAPL\n").unwrap();
        assert!(matches!(
            build_backtest_config(&adapter),
            Err(TradesimError::ConfigMissing { key, .. }) if key == "initial_budget"
        ));
    }
}
