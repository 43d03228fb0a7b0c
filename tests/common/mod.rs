#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use stockscan::domain::condition::{Condition, Operator};
use stockscan::domain::error::ScanError;
use stockscan::domain::indicator::IndicatorSpec;
pub use stockscan::domain::ohlcv::{Bar, PriceField, Series};
use stockscan::domain::strategy::Strategy;
use stockscan::domain::universe::Universe;
use stockscan::ports::data_port::DataPort;
use std::collections::HashMap;

pub const BASE_TS: i64 = 1_704_067_200;
pub const DAY: i64 = 86_400;

pub struct MockDataPort {
    pub data: HashMap<String, Series>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, symbol: &str, series: Series) -> Self {
        self.data.insert(symbol.to_string(), series);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(&self, symbol: &str) -> Result<Series, ScanError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ScanError::DataSource {
                reason: reason.clone(),
            });
        }
        self.data
            .get(symbol)
            .cloned()
            .ok_or_else(|| ScanError::NoData {
                symbol: symbol.to_string(),
            })
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScanError> {
        let mut symbols: Vec<String> = self
            .data
            .keys()
            .chain(self.errors.keys())
            .cloned()
            .collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn make_bar(day: i64, close: f64) -> Bar {
    Bar {
        timestamp: BASE_TS + day * DAY,
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: 10_000,
    }
}

/// Daily bars with a 1% high/low band around each close.
pub fn series_from_closes(closes: &[f64]) -> Series {
    Series::new(
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| make_bar(i as i64, c))
            .collect(),
    )
    .unwrap()
}

pub fn rising(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

pub fn universe_of(entries: &[(&str, Vec<f64>)]) -> Universe {
    let mut universe = Universe::new();
    for (symbol, closes) in entries {
        universe.insert(*symbol, series_from_closes(closes));
    }
    universe
}

pub fn close() -> IndicatorSpec {
    IndicatorSpec::Price {
        field: PriceField::Close,
    }
}

pub fn make_strategy(id: &str, conditions: Vec<Condition>) -> Strategy {
    Strategy {
        id: id.to_string(),
        name: id.to_string(),
        description: String::new(),
        conditions,
        timeframe: "1D".to_string(),
    }
}

pub fn close_above_sma(period: usize) -> Strategy {
    make_strategy(
        "close_above_sma",
        vec![Condition::against_indicator(
            close(),
            Operator::GreaterThan,
            IndicatorSpec::Sma { period },
        )],
    )
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap()
}

/// CSV body in the on-disk data format.
pub fn csv_from_closes(closes: &[f64]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for (i, &c) in closes.iter().enumerate() {
        let bar = make_bar(i as i64, c);
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp, bar.open, bar.high, bar.low, bar.close, bar.volume
        ));
    }
    out
}
