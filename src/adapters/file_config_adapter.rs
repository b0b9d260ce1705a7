//! INI file configuration adapter.

use crate::domain::error::TradesimError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TradesimError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| TradesimError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, TradesimError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TradesimError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    /// Overrides a single value, e.g. from a command-line flag.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.config.set(section, key, Some(value.to_string()));
    }

    /// Trimmed value, with blank entries treated as absent.
    fn lookup(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_or<T: FromStr>(&self, section: &str, key: &str, default: T) -> T {
        self.lookup(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.lookup(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.parse_or(section, key, default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[backtest]
symbol = AAPL
initial_budget = 10000.50
start_date = 2020-01-01
data_dir = ./data

[strategy]
name = sma_crossover
fast_period = 10
slow_period = 30
"#;

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("backtest", "symbol"), Some("AAPL".to_string()));
        assert_eq!(
            adapter.get_string("strategy", "name"),
            Some("sma_crossover".to_string())
        );
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "symbol"), None);
    }

    #[test]
    fn get_int_and_default() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("strategy", "fast_period", 0), 10);
        assert_eq!(adapter.get_int("strategy", "missing", 42), 42);
        assert_eq!(adapter.get_int("backtest", "symbol", 7), 7);
    }

    #[test]
    fn get_decimal_is_exact() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_decimal("backtest", "initial_budget").unwrap(),
            Some(dec!(10000.50))
        );
        assert_eq!(adapter.get_decimal("backtest", "missing").unwrap(), None);
        assert!(adapter.get_decimal("backtest", "symbol").is_err());
    }

    #[test]
    fn blank_values_are_absent() {
        let adapter =
            FileConfigAdapter::from_string("[backtest]\nend_date =\nsymbol =   MSFT  \n").unwrap();
        assert_eq!(adapter.get_string("backtest", "end_date"), None);
        assert_eq!(adapter.get_string("backtest", "symbol"), Some("MSFT".to_string()));
        assert_eq!(adapter.get_int("backtest", "end_date", 3), 3);
    }

    #[test]
    fn set_overrides_value() {
        let mut adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        adapter.set("backtest", "symbol", "MSFT");
        adapter.set("backtest", "output_dir", "out");
        assert_eq!(adapter.get_string("backtest", "symbol"), Some("MSFT".to_string()));
        assert_eq!(adapter.get_string("backtest", "output_dir"), Some("out".to_string()));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "data_dir"),
            Some("./data".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_parse_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(TradesimError::ConfigParse { .. })));
    }
}
