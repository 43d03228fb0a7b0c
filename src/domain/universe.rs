//! Instrument universe: the materialised per-symbol series a scan runs over.
//!
//! Symbols come either from a configured comma list or from everything the
//! data source knows about. Symbols that fail to load are skipped with a
//! warning rather than aborting the scan.

use crate::domain::error::ScanError;
use crate::domain::ohlcv::Series;
use crate::ports::data_port::DataPort;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct Universe {
    series: BTreeMap<String, Series>,
    display_names: HashMap<String, String>,
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, series: Series) {
        self.series.insert(symbol.into(), series);
    }

    pub fn with_display_names(mut self, names: HashMap<String, String>) -> Self {
        self.display_names = names;
        self
    }

    /// Human-readable name, falling back to the symbol itself.
    pub fn display_name<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.display_names
            .get(symbol)
            .map(String::as_str)
            .unwrap_or(symbol)
    }

    pub fn series(&self, symbol: &str) -> Option<&Series> {
        self.series.get(symbol)
    }

    /// Symbols in ascending order with their series.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.series.iter().map(|(s, series)| (s.as_str(), series))
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.series.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

pub struct LoadedUniverse {
    pub universe: Universe,
    pub skipped: Vec<SkippedSymbol>,
}

#[derive(Debug, Clone)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    LoadFailed(String),
}

/// Fetch every requested symbol, keeping those that load with at least one bar.
///
/// With `lookback_days`, each series is cut to that many calendar days before
/// its last bar. Fails only when nothing could be loaded at all.
pub fn load_universe(
    data_port: &dyn DataPort,
    symbols: &[String],
    lookback_days: Option<u32>,
) -> Result<LoadedUniverse, ScanError> {
    let mut universe = Universe::new();
    let mut skipped = Vec::new();

    for symbol in symbols {
        let fetched = data_port
            .fetch_series(symbol)
            .map(|series| match lookback_days {
                Some(days) => series.trailing_days(days),
                None => series,
            });
        match fetched {
            Ok(series) if series.is_empty() => {
                tracing::warn!(%symbol, "skipping symbol with no bars");
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: SkipReason::NoData,
                });
            }
            Ok(series) => {
                tracing::debug!(%symbol, bars = series.len(), "loaded series");
                universe.insert(symbol.clone(), series);
            }
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "skipping symbol");
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: SkipReason::LoadFailed(e.to_string()),
                });
            }
        }
    }

    if universe.is_empty() {
        return Err(ScanError::DataSource {
            reason: format!("none of the {} requested symbols could be loaded", symbols.len()),
        });
    }

    if !skipped.is_empty() {
        tracing::info!(
            loaded = universe.len(),
            requested = symbols.len(),
            "universe loaded with skipped symbols"
        );
    }

    Ok(LoadedUniverse { universe, skipped })
}
