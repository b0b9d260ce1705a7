//! CSV file market data adapter.
//!
//! One file per symbol, `<base>/<SYMBOL>.csv`, with a header row and columns
//! `date,open,high,low,close,adj_close,volume`. The `adj_close` column may be
//! omitted, in which case the close is used.

use crate::domain::error::TradesimError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn field<'r>(record: &'r StringRecord, idx: usize, name: &str) -> Result<&'r str, TradesimError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| TradesimError::DataSource {
            reason: format!("missing {} column", name),
        })
}

fn decimal_field(record: &StringRecord, idx: usize, name: &str) -> Result<Decimal, TradesimError> {
    let raw = field(record, idx, name)?;
    Decimal::from_str(raw).map_err(|e| TradesimError::DataSource {
        reason: format!("invalid {} value {:?}: {}", name, raw, e),
    })
}

fn parse_bar(symbol: &str, record: &StringRecord) -> Result<PriceBar, TradesimError> {
    let date_str = field(record, 0, "date")?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
        TradesimError::DataSource {
            reason: format!("invalid date format: {}", e),
        }
    })?;

    let open = decimal_field(record, 1, "open")?;
    let high = decimal_field(record, 2, "high")?;
    let low = decimal_field(record, 3, "low")?;
    let close = decimal_field(record, 4, "close")?;

    let (adjusted_close, volume_idx) = if record.len() >= 7 {
        (decimal_field(record, 5, "adj_close")?, 6)
    } else {
        (close, 5)
    };

    let raw_volume = field(record, volume_idx, "volume")?;
    let volume: u64 = raw_volume.parse().map_err(|e| TradesimError::DataSource {
        reason: format!("invalid volume value {:?}: {}", raw_volume, e),
    })?;

    Ok(PriceBar {
        date,
        symbol: symbol.to_string(),
        open,
        high,
        low,
        close,
        adjusted_close,
        volume,
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, TradesimError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| TradesimError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| TradesimError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;
            let bar = parse_bar(symbol, &record)?;

            if start_date.is_some_and(|start| bar.date < start)
                || end_date.is_some_and(|end| bar.date > end)
            {
                continue;
            }
            if !bar.is_consistent() {
                tracing::warn!(symbol, date = %bar.date, "bar violates OHLC bounds");
            }
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        tracing::debug!(symbol, bars = bars.len(), path = %path.display(), "loaded bars");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TradesimError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TradesimError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| TradesimError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
