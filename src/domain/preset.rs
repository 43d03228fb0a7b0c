//! Preset rule sets.
//!
//! Each preset is a fixed rule built directly on the indicator primitives.
//! Instruments with fewer bars than the longest window a rule needs are not
//! scored. The top-movers presets are the exception to per-instrument
//! verdicts: every qualifying instrument is scored, then the best
//! [`TOP_MOVERS_LIMIT`] by percent change are marked matched.

use crate::domain::error::ScanError;
use crate::domain::ohlcv::Series;
use crate::domain::scan::{evaluate_universe, ScanOptions, ScanResult, Verdict};
use crate::domain::series_math::{defined, ema, latest, linear_regression_slope, rolling_mean};
use crate::domain::universe::Universe;
use crate::domain::zigzag::{self, DEFAULT_MIN_RETRACE_PCT};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const TOP_MOVERS_LIMIT: usize = 20;
pub const DEFAULT_MOVER_DAYS: usize = 7;

/// Points used for moving-average slopes.
const SLOPE_POINTS: usize = 5;
/// Trailing closes searched for a resistance peak.
const RESISTANCE_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Close just above a rising 44-day SMA.
    Ma44,
    /// 44-day SMA within 1% of the 200-day SMA.
    Ma44CrossMa200,
    /// 10/30 EMAs within 0.05% of each other.
    EmaCrossover,
    /// Close pulled back to just above a flat or falling 200-day SMA.
    DownToMa200,
    /// Close within 1% of recent resistance while the 200-day SMA rises.
    MagnetEffect,
    TopGainers { days: usize },
    TopLosers { days: usize },
}

impl Preset {
    pub const NAMES: [&'static str; 7] = [
        "MA44",
        "MA44_CROSS_MA200",
        "EMA_CROSSOVER",
        "DOWN_TO_MA200",
        "MAGNET_EFFECT",
        "TOP_GAINERS",
        "TOP_LOSERS",
    ];

    /// Parse a preset name; `days` only applies to the top-movers presets.
    pub fn parse(name: &str, days: Option<usize>) -> Result<Self, ScanError> {
        let days = days.unwrap_or(DEFAULT_MOVER_DAYS);
        let preset = match name.trim().to_uppercase().as_str() {
            "MA44" => Preset::Ma44,
            "MA44_CROSS_MA200" => Preset::Ma44CrossMa200,
            "EMA_CROSSOVER" => Preset::EmaCrossover,
            "DOWN_TO_MA200" => Preset::DownToMa200,
            "MAGNET_EFFECT" => Preset::MagnetEffect,
            "TOP_GAINERS" => Preset::TopGainers { days },
            "TOP_LOSERS" => Preset::TopLosers { days },
            _ => return Err(ScanError::UnknownPreset(name.to_string())),
        };
        if days == 0 && matches!(preset, Preset::TopGainers { .. } | Preset::TopLosers { .. }) {
            return Err(ScanError::ConfigInvalid {
                section: "preset".into(),
                key: "days".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(preset)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Ma44 => "MA44",
            Preset::Ma44CrossMa200 => "MA44_CROSS_MA200",
            Preset::EmaCrossover => "EMA_CROSSOVER",
            Preset::DownToMa200 => "DOWN_TO_MA200",
            Preset::MagnetEffect => "MAGNET_EFFECT",
            Preset::TopGainers { .. } => "TOP_GAINERS",
            Preset::TopLosers { .. } => "TOP_LOSERS",
        }
    }

    /// Fewest bars an instrument needs to be scored.
    pub fn min_bars(&self) -> usize {
        match self {
            Preset::Ma44 => 44,
            Preset::Ma44CrossMa200 | Preset::DownToMa200 | Preset::MagnetEffect => 200,
            Preset::EmaCrossover => 30,
            Preset::TopGainers { days } | Preset::TopLosers { days } => *days,
        }
    }

    /// Calendar days of history a data source should fetch for this preset.
    pub fn lookback_days(&self) -> u32 {
        match self {
            Preset::Ma44 | Preset::EmaCrossover => 90,
            Preset::Ma44CrossMa200 | Preset::DownToMa200 | Preset::MagnetEffect => 365,
            Preset::TopGainers { .. } | Preset::TopLosers { .. } => 30,
        }
    }

    pub fn all(days: usize) -> Vec<Preset> {
        vec![
            Preset::Ma44,
            Preset::Ma44CrossMa200,
            Preset::EmaCrossover,
            Preset::DownToMa200,
            Preset::MagnetEffect,
            Preset::TopGainers { days },
            Preset::TopLosers { days },
        ]
    }
}

impl FromStr for Preset {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::parse(s, None)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::TopGainers { days } | Preset::TopLosers { days } => {
                write!(f, "{}({})", self.name(), days)
            }
            _ => f.write_str(self.name()),
        }
    }
}

pub fn run_preset(
    preset: &Preset,
    universe: &Universe,
    options: &ScanOptions,
    evaluated_at: DateTime<Utc>,
) -> Vec<ScanResult> {
    tracing::info!(preset = %preset, instruments = universe.len(), "running preset");
    let min_bars = preset.min_bars();
    let rule: fn(&Series) -> Option<Verdict> = match preset {
        Preset::Ma44 => ma44,
        Preset::Ma44CrossMa200 => ma44_cross_ma200,
        Preset::EmaCrossover => ema_crossover,
        Preset::DownToMa200 => down_to_ma200,
        Preset::MagnetEffect => magnet_effect,
        Preset::TopGainers { days } => {
            return top_movers(*days, Ordering::Greater, universe, options, evaluated_at);
        }
        Preset::TopLosers { days } => {
            return top_movers(*days, Ordering::Less, universe, options, evaluated_at);
        }
    };

    evaluate_universe(universe, options, evaluated_at, |series| {
        if series.len() < min_bars {
            return Ok(None);
        }
        Ok(rule(series))
    })
}

fn sma_of_closes(series: &Series, period: usize) -> Vec<Option<f64>> {
    rolling_mean(&defined(&series.closes()), period)
}

fn values(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn ma44(series: &Series) -> Option<Verdict> {
    let sma44 = sma_of_closes(series, 44);
    let ma = latest(&sma44)?;
    let close = series.last()?.close;
    let slope = linear_regression_slope(&sma44, SLOPE_POINTS);
    let diff_pct = (ma - close) / close * 100.0;

    let slope_ok = slope > 0.0;
    let diff_ok = -3.0 < diff_pct && diff_pct < 3.0;
    let above = close > ma;

    Some(Verdict {
        matched: slope_ok && diff_ok && above,
        conditions_met: vec![slope_ok, diff_ok, above],
        current_price: close,
        indicator_values: values(&[("ma44", ma), ("slope", slope), ("diff_pct", diff_pct)]),
    })
}

fn ma44_cross_ma200(series: &Series) -> Option<Verdict> {
    let ma44 = latest(&sma_of_closes(series, 44))?;
    let ma200 = latest(&sma_of_closes(series, 200))?;
    let close = series.last()?.close;
    let diff_pct = ((ma44 - ma200) / ma44).abs() * 100.0;
    let near_cross = diff_pct < 1.0;

    Some(Verdict {
        matched: near_cross,
        conditions_met: vec![near_cross],
        current_price: close,
        indicator_values: values(&[("ma44", ma44), ("ma200", ma200), ("diff_pct", diff_pct)]),
    })
}

fn ema_crossover(series: &Series) -> Option<Verdict> {
    let closes = defined(&series.closes());
    let ema10 = latest(&ema(&closes, 10))?;
    let ema30 = latest(&ema(&closes, 30))?;
    let close = series.last()?.close;
    let diff_pct = ((ema10 - ema30) / ema30).abs() * 100.0;
    let approaching = diff_pct <= 0.05;

    Some(Verdict {
        matched: approaching,
        conditions_met: vec![approaching],
        current_price: close,
        indicator_values: values(&[("ema10", ema10), ("ema30", ema30), ("diff_pct", diff_pct)]),
    })
}

fn down_to_ma200(series: &Series) -> Option<Verdict> {
    let sma200 = sma_of_closes(series, 200);
    let ma = latest(&sma200)?;
    let close = series.last()?.close;
    let slope = linear_regression_slope(&sma200, SLOPE_POINTS);
    let diff_pct = (ma - close) / close * 100.0;

    let diff_ok = -3.0 < diff_pct && diff_pct < 3.0;
    let slope_ok = slope < 1.0;
    let above = close > ma;

    Some(Verdict {
        matched: diff_ok && slope_ok && above,
        conditions_met: vec![diff_ok, slope_ok, above],
        current_price: close,
        indicator_values: values(&[("ma200", ma), ("slope", slope), ("diff_pct", diff_pct)]),
    })
}

fn magnet_effect(series: &Series) -> Option<Verdict> {
    let ma44 = latest(&sma_of_closes(series, 44))?;
    let sma200 = sma_of_closes(series, 200);
    latest(&sma200)?;

    let closes = series.closes();
    let tail = &closes[closes.len().saturating_sub(RESISTANCE_WINDOW)..];
    // no confirmed peak means no resistance to score against
    let resistance = zigzag::highest_peak(&zigzag::extract(tail, DEFAULT_MIN_RETRACE_PCT))?;

    let close = series.last()?.close;
    let slope = linear_regression_slope(&sma200, SLOPE_POINTS);
    let res_diff_pct = (resistance - close) / close * 100.0;

    let slope_ok = slope > 0.0;
    let above_ma44 = close > ma44;
    let near_resistance = -1.0 < res_diff_pct && res_diff_pct < 1.0;

    Some(Verdict {
        matched: slope_ok && above_ma44 && near_resistance,
        conditions_met: vec![slope_ok, above_ma44, near_resistance],
        current_price: close,
        indicator_values: values(&[
            ("ma44", ma44),
            ("ma200_slope", slope),
            ("resistance", resistance),
            ("res_diff_pct", res_diff_pct),
        ]),
    })
}

/// Percent change from the close `days` bars before the end (inclusive) to the last close.
fn change_pct(series: &Series, days: usize) -> Option<f64> {
    if days == 0 || series.len() < days {
        return None;
    }
    let bars = series.bars();
    let start = bars[bars.len() - days].close;
    let end = bars[bars.len() - 1].close;
    let pct = (end - start) / start * 100.0;
    pct.is_finite().then_some(pct)
}

/// Score every instrument by percent change and mark the leading ones.
///
/// `direction` is `Greater` for gainers (largest change first) and `Less`
/// for losers.
fn top_movers(
    days: usize,
    direction: Ordering,
    universe: &Universe,
    options: &ScanOptions,
    evaluated_at: DateTime<Utc>,
) -> Vec<ScanResult> {
    let mut results = evaluate_universe(universe, options, evaluated_at, |series| {
        let Some(pct) = change_pct(series, days) else {
            return Ok(None);
        };
        let Some(last) = series.last() else {
            return Ok(None);
        };
        Ok(Some(Verdict {
            matched: false,
            conditions_met: Vec::new(),
            current_price: last.close,
            indicator_values: values(&[("change_pct", pct), ("days", days as f64)]),
        }))
    });

    let key = |r: &ScanResult| r.indicator_values.get("change_pct").copied().unwrap_or(0.0);
    results.sort_by(|a, b| {
        let ord = key(a).total_cmp(&key(b));
        if direction == Ordering::Greater { ord.reverse() } else { ord }
    });
    for result in results.iter_mut().take(TOP_MOVERS_LIMIT) {
        result.matched = true;
    }
    results
}
