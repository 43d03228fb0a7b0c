//! CSV file data adapter.
//!
//! One file per symbol, `<data_dir>/<SYMBOL>.csv`, with the header
//! `timestamp,open,high,low,close,volume` (columns matched by name). The
//! timestamp is either integer epoch seconds or a `YYYY-MM-DD` date taken as
//! midnight UTC.

use crate::domain::error::ScanError;
use crate::domain::ohlcv::{Bar, Series};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const COLUMNS: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

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

fn data_error(reason: String) -> ScanError {
    ScanError::DataSource { reason }
}

pub(crate) fn parse_timestamp(value: &str) -> Result<i64, ScanError> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<i64>() {
        return Ok(secs);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| {
            data_error(format!(
                "invalid timestamp '{}', expected epoch seconds or YYYY-MM-DD",
                value
            ))
        })
}

fn parse_price(value: &str, column: &str, line: u64) -> Result<f64, ScanError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| data_error(format!("line {}: invalid {} value: {}", line, column, e)))
}

fn parse_volume(value: &str, line: u64) -> Result<u64, ScanError> {
    let value = value.trim();
    if let Ok(v) = value.parse::<u64>() {
        return Ok(v);
    }
    // some exports write volume as a float
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v.round() as u64),
        _ => Err(data_error(format!(
            "line {}: invalid volume value '{}'",
            line, value
        ))),
    }
}

impl DataPort for CsvAdapter {
    fn fetch_series(&self, symbol: &str) -> Result<Series, ScanError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ScanError::NoData {
                symbol: symbol.to_string(),
            },
            _ => data_error(format!("failed to read {}: {}", path.display(), e)),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| data_error(format!("CSV header error in {}: {}", path.display(), e)))?
            .clone();

        let mut index = [0usize; 6];
        for (slot, column) in index.iter_mut().zip(COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column))
                .ok_or_else(|| {
                    data_error(format!("{}: missing {} column", path.display(), column))
                })?;
        }

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let field = |i: usize| {
                record
                    .get(index[i])
                    .ok_or_else(|| data_error(format!("line {}: missing {} column", line, COLUMNS[i])))
            };

            bars.push(Bar {
                timestamp: parse_timestamp(field(0)?)?,
                open: parse_price(field(1)?, COLUMNS[1], line)?,
                high: parse_price(field(2)?, COLUMNS[2], line)?,
                low: parse_price(field(3)?, COLUMNS[3], line)?,
                close: parse_price(field(4)?, COLUMNS[4], line)?,
                volume: parse_volume(field(5)?, line)?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        tracing::debug!(%symbol, bars = bars.len(), "read csv series");
        Series::new(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScanError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_error(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_error(format!("directory entry error: {}", e)))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                symbols.push(stem.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

/// Read a `symbol,display_name` CSV into a lookup table.
pub fn load_display_names(path: &Path) -> Result<HashMap<String, String>, ScanError> {
    let mut rdr = csv::Reader::from_path(path)
        .map_err(|e| data_error(format!("failed to read {}: {}", path.display(), e)))?;
    let mut names = HashMap::new();
    for result in rdr.records() {
        let record = result.map_err(|e| data_error(format!("CSV parse error: {}", e)))?;
        match (record.get(0), record.get(1)) {
            (Some(symbol), Some(name)) if !symbol.trim().is_empty() => {
                names.insert(symbol.trim().to_string(), name.trim().to_string());
            }
            _ => continue,
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "timestamp,open,high,low,close,volume\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n";

        fs::write(path.join("INFY.csv"), csv_content).unwrap();
        fs::write(
            path.join("TCS.csv"),
            "timestamp,open,high,low,close,volume\n1705276800,10,11,9,10.5,100.0\n",
        )
        .unwrap();
        fs::write(path.join("notes.txt"), "not data").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_series_sorts_and_parses_dates() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter.fetch_series("INFY").unwrap();
        assert_eq!(series.len(), 3);
        let first = &series.bars()[0];
        assert_eq!(first.timestamp, 1_705_276_800);
        assert_eq!(first.open, 100.0);
        assert_eq!(first.high, 110.0);
        assert_eq!(first.low, 90.0);
        assert_eq!(first.close, 105.0);
        assert_eq!(first.volume, 50_000);
        assert_eq!(series.closes(), vec![105.0, 110.0, 115.0]);
    }

    #[test]
    fn fetch_series_accepts_epoch_seconds() {
        let (_dir, path) = setup_test_data();
        let series = CsvAdapter::new(path).fetch_series("TCS").unwrap();
        assert_eq!(series.bars()[0].timestamp, 1_705_276_800);
        assert_eq!(series.bars()[0].volume, 100);
    }

    #[test]
    fn columns_matched_by_name() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("X.csv"),
            "close,volume,timestamp,open,high,low\n12,5,2024-02-01,10,13,9\n",
        )
        .unwrap();
        let series = CsvAdapter::new(dir.path().to_path_buf()).fetch_series("X").unwrap();
        assert_eq!(series.bars()[0].close, 12.0);
        assert_eq!(series.bars()[0].low, 9.0);
    }

    #[test]
    fn fetch_series_missing_file_is_no_data() {
        let (_dir, path) = setup_test_data();
        let result = CsvAdapter::new(path).fetch_series("XYZ");
        assert!(matches!(result, Err(ScanError::NoData { symbol }) if symbol == "XYZ"));
    }

    #[test]
    fn fetch_series_unreadable_path_is_data_source_error() {
        let dir = TempDir::new().unwrap();
        // a directory named like a data file cannot be read as one
        fs::create_dir(dir.path().join("DIR.csv")).unwrap();
        let result = CsvAdapter::new(dir.path().to_path_buf()).fetch_series("DIR");
        assert!(matches!(result, Err(ScanError::DataSource { .. })));
    }

    #[test]
    fn fetch_series_missing_column_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("X.csv"), "timestamp,open,high,low,close\n1,1,1,1,1\n").unwrap();
        let err = CsvAdapter::new(dir.path().to_path_buf())
            .fetch_series("X")
            .unwrap_err();
        assert!(err.to_string().contains("volume"));
    }

    #[test]
    fn fetch_series_rejects_bad_price() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("X.csv"),
            "timestamp,open,high,low,close,volume\n2024-01-01,1,1,1,abc,1\n",
        )
        .unwrap();
        let err = CsvAdapter::new(dir.path().to_path_buf())
            .fetch_series("X")
            .unwrap_err();
        assert!(err.to_string().contains("close"));
    }

    #[test]
    fn list_symbols_returns_csv_stems() {
        let (_dir, path) = setup_test_data();
        let symbols = CsvAdapter::new(path).list_symbols().unwrap();
        assert_eq!(symbols, vec!["INFY", "TCS"]);
    }

    #[test]
    fn parse_timestamp_formats() {
        assert_eq!(parse_timestamp("1705276800").unwrap(), 1_705_276_800);
        assert_eq!(parse_timestamp("2024-01-15").unwrap(), 1_705_276_800);
        assert!(parse_timestamp("15/01/2024").is_err());
    }

    #[test]
    fn display_names_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("names.csv");
        fs::write(&path, "symbol,display_name\nINFY,Infosys Ltd\nTCS, Tata Consultancy \n").unwrap();
        let names = load_display_names(&path).unwrap();
        assert_eq!(names["INFY"], "Infosys Ltd");
        assert_eq!(names["TCS"], "Tata Consultancy");
    }
}
