//! Scan orchestration: fan a strategy out over a universe and rank the results.
//!
//! Every instrument is evaluated independently. An instrument whose evaluation
//! fails is logged and omitted; the batch itself never fails. Results come back
//! in symbol order whether or not the worker pool is used.

use crate::domain::error::ScanError;
use crate::domain::ohlcv::Series;
use crate::domain::rule_eval::evaluate_strategy;
use crate::domain::strategy::Strategy;
use crate::domain::universe::Universe;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::BTreeMap;

pub const DEFAULT_MAX_WORKERS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub symbol: String,
    pub display_name: String,
    pub matched: bool,
    /// Per-condition verdicts in strategy order; empty for ranking-only presets.
    pub conditions_met: Vec<bool>,
    pub current_price: f64,
    pub indicator_values: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub parallel: bool,
    pub max_workers: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

/// Verdict for one instrument before symbol metadata is attached.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Verdict {
    pub matched: bool,
    pub conditions_met: Vec<bool>,
    pub current_price: f64,
    pub indicator_values: BTreeMap<String, f64>,
}

/// Run `evaluate` over every instrument in `universe`.
///
/// `Ok(None)` means the instrument was not scored (for example too little
/// history for a preset) and is left out silently. `Err` is logged and the
/// instrument is dropped.
pub(crate) fn evaluate_universe<F>(
    universe: &Universe,
    options: &ScanOptions,
    evaluated_at: DateTime<Utc>,
    evaluate: F,
) -> Vec<ScanResult>
where
    F: Fn(&Series) -> Result<Option<Verdict>, ScanError> + Sync,
{
    let entries: Vec<(&str, &Series)> = universe.iter().collect();

    let run_one = |(symbol, series): &(&str, &Series)| -> Option<ScanResult> {
        if series.is_empty() {
            tracing::warn!(%symbol, "skipping symbol with empty series");
            return None;
        }
        match evaluate(series) {
            Ok(Some(verdict)) => {
                tracing::debug!(%symbol, matched = verdict.matched, "evaluated");
                Some(ScanResult {
                    symbol: symbol.to_string(),
                    display_name: universe.display_name(symbol).to_string(),
                    matched: verdict.matched,
                    conditions_met: verdict.conditions_met,
                    current_price: verdict.current_price,
                    indicator_values: verdict.indicator_values,
                    timestamp: evaluated_at,
                })
            }
            Ok(None) => {
                tracing::debug!(%symbol, bars = series.len(), "not scored");
                None
            }
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "evaluation failed, dropping symbol");
                None
            }
        }
    };

    let pool = if options.parallel && options.max_workers > 1 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.max_workers)
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                tracing::warn!(error = %e, "worker pool unavailable, scanning sequentially");
                None
            }
        }
    } else {
        None
    };

    let results: Vec<ScanResult> = match pool {
        Some(pool) => pool.install(|| entries.par_iter().filter_map(run_one).collect()),
        None => entries.iter().filter_map(run_one).collect(),
    };

    tracing::info!(
        instruments = entries.len(),
        scored = results.len(),
        matched = results.iter().filter(|r| r.matched).count(),
        "scan complete"
    );
    results
}

/// Evaluate a user-defined strategy against every instrument.
pub fn scan(
    strategy: &Strategy,
    universe: &Universe,
    options: &ScanOptions,
    evaluated_at: DateTime<Utc>,
) -> Vec<ScanResult> {
    tracing::info!(strategy = %strategy.id, conditions = strategy.conditions.len(), "scanning");
    evaluate_universe(universe, options, evaluated_at, |series| {
        let Some(last) = series.last() else {
            return Ok(None);
        };
        let eval = evaluate_strategy(series, strategy);
        Ok(Some(Verdict {
            matched: eval.matched,
            conditions_met: eval.conditions_met,
            current_price: last.close,
            indicator_values: eval.indicator_values,
        }))
    })
}

/// Matched results first; ties keep their incoming order.
pub fn rank_results(results: &mut [ScanResult]) {
    results.sort_by_key(|r| !r.matched);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{Condition, Operator};
    use crate::domain::indicator::test_support::flat_bars;
    use crate::domain::indicator::IndicatorSpec;
    use crate::domain::ohlcv::PriceField;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn close_above(value: f64) -> Strategy {
        Strategy {
            id: "close_above".into(),
            name: "Close above".into(),
            description: String::new(),
            conditions: vec![Condition::against_value(
                IndicatorSpec::Price {
                    field: PriceField::Close,
                },
                Operator::GreaterThan,
                value,
            )],
            timeframe: "1D".into(),
        }
    }

    fn result(symbol: &str, matched: bool) -> ScanResult {
        ScanResult {
            symbol: symbol.into(),
            display_name: symbol.into(),
            matched,
            conditions_met: vec![],
            current_price: 1.0,
            indicator_values: BTreeMap::new(),
            timestamp: at(),
        }
    }

    #[test]
    fn scan_produces_one_result_per_symbol() {
        let mut universe = Universe::new();
        universe.insert("HIGH", flat_bars(&[100.0, 150.0]));
        universe.insert("LOW", flat_bars(&[100.0, 50.0]));
        let results = scan(&close_above(120.0), &universe, &ScanOptions::default(), at());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].symbol, "HIGH");
        assert!(results[0].matched);
        assert_eq!(results[0].conditions_met, vec![true]);
        assert_eq!(results[0].current_price, 150.0);
        assert!(!results[1].matched);
        assert_eq!(results[1].timestamp, at());
    }

    #[test]
    fn scan_skips_empty_series() {
        let mut universe = Universe::new();
        universe.insert("EMPTY", Series::default());
        universe.insert("OK", flat_bars(&[200.0]));
        let results = scan(&close_above(120.0), &universe, &ScanOptions::default(), at());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "OK");
    }

    #[test]
    fn scan_of_empty_universe_is_empty() {
        let results = scan(&close_above(1.0), &Universe::new(), &ScanOptions::default(), at());
        assert!(results.is_empty());
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut universe = Universe::new();
        for i in 0..25 {
            let closes: Vec<f64> = (0..10).map(|j| 100.0 + (i * j) as f64).collect();
            universe.insert(format!("S{:02}", i), flat_bars(&closes));
        }
        let strategy = close_above(150.0);
        let sequential = scan(&strategy, &universe, &ScanOptions::default(), at());
        let parallel = scan(
            &strategy,
            &universe,
            &ScanOptions {
                parallel: true,
                max_workers: 4,
            },
            at(),
        );
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn evaluation_failure_drops_only_that_symbol() {
        let mut universe = Universe::new();
        universe.insert("BAD", flat_bars(&[1.0]));
        universe.insert("GOOD", flat_bars(&[2.0]));
        let results = evaluate_universe(&universe, &ScanOptions::default(), at(), |series| {
            let last = series.last().map(|b| b.close).unwrap_or_default();
            if last < 1.5 {
                return Err(ScanError::InvalidBar {
                    index: 0,
                    reason: "boom".into(),
                });
            }
            Ok(Some(Verdict {
                matched: true,
                conditions_met: vec![],
                current_price: last,
                indicator_values: BTreeMap::new(),
            }))
        });
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol, "GOOD");
    }

    #[test]
    fn display_names_are_attached() {
        let mut names = std::collections::HashMap::new();
        names.insert("INFY".to_string(), "Infosys".to_string());
        let mut universe = Universe::new().with_display_names(names);
        universe.insert("INFY", flat_bars(&[10.0]));
        universe.insert("TCS", flat_bars(&[10.0]));
        let results = scan(&close_above(1.0), &universe, &ScanOptions::default(), at());
        assert_eq!(results[0].display_name, "Infosys");
        assert_eq!(results[1].display_name, "TCS");
    }

    #[test]
    fn rank_puts_matched_first_and_is_stable() {
        let mut results = vec![
            result("A", false),
            result("B", true),
            result("C", false),
            result("D", true),
        ];
        rank_results(&mut results);
        let order: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["B", "D", "A", "C"]);
    }
}
