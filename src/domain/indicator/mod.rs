//! Technical indicator implementations.
//!
//! This module provides:
//! - `IndicatorSpec`: indicator identity plus typed, defaulted parameters
//! - `IndicatorSeries`: one sample per bar, `None` where undefined
//! - `calculate`: dispatch from a spec to the matching calculator
//! - crossover/crossunder edge detectors

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod crossover;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use crossover::{check_crossover, check_crossunder};

use crate::domain::ohlcv::{PriceField, Series};
use crate::domain::series_math::{self, Sample};
use std::fmt;

pub const DEFAULT_MA_PERIOD: usize = 20;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_ATR_PERIOD: usize = 14;
pub const DEFAULT_ADX_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacdLine {
    Macd,
    Signal,
    Histogram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StochasticLine {
    K,
    D,
}

/// Indicator kinds without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Macd,
    BollingerBands,
    Atr,
    Stochastic,
    Adx,
    Volume,
    Price,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorSpec {
    Sma {
        period: usize,
    },
    Ema {
        period: usize,
    },
    Rsi {
        period: usize,
    },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
        line: MacdLine,
    },
    Bollinger {
        period: usize,
        std_dev: f64,
        band: Band,
    },
    Atr {
        period: usize,
    },
    Stochastic {
        k_period: usize,
        d_period: usize,
        line: StochasticLine,
    },
    Adx {
        period: usize,
    },
    Volume,
    Price {
        field: PriceField,
    },
}

impl IndicatorSpec {
    /// The spec for `kind` with every parameter at its default.
    pub fn with_defaults(kind: IndicatorKind) -> Self {
        match kind {
            IndicatorKind::Sma => IndicatorSpec::Sma {
                period: DEFAULT_MA_PERIOD,
            },
            IndicatorKind::Ema => IndicatorSpec::Ema {
                period: DEFAULT_MA_PERIOD,
            },
            IndicatorKind::Rsi => IndicatorSpec::Rsi {
                period: DEFAULT_RSI_PERIOD,
            },
            IndicatorKind::Macd => IndicatorSpec::Macd {
                fast: macd::DEFAULT_FAST,
                slow: macd::DEFAULT_SLOW,
                signal: macd::DEFAULT_SIGNAL,
                line: MacdLine::Macd,
            },
            IndicatorKind::BollingerBands => IndicatorSpec::Bollinger {
                period: bollinger::DEFAULT_PERIOD,
                std_dev: bollinger::DEFAULT_STD_DEV,
                band: Band::Middle,
            },
            IndicatorKind::Atr => IndicatorSpec::Atr {
                period: DEFAULT_ATR_PERIOD,
            },
            IndicatorKind::Stochastic => IndicatorSpec::Stochastic {
                k_period: stochastic::DEFAULT_K_PERIOD,
                d_period: stochastic::DEFAULT_D_PERIOD,
                line: StochasticLine::K,
            },
            IndicatorKind::Adx => IndicatorSpec::Adx {
                period: DEFAULT_ADX_PERIOD,
            },
            IndicatorKind::Volume => IndicatorSpec::Volume,
            IndicatorKind::Price => IndicatorSpec::Price {
                field: PriceField::Close,
            },
        }
    }

    pub fn kind(&self) -> IndicatorKind {
        match self {
            IndicatorSpec::Sma { .. } => IndicatorKind::Sma,
            IndicatorSpec::Ema { .. } => IndicatorKind::Ema,
            IndicatorSpec::Rsi { .. } => IndicatorKind::Rsi,
            IndicatorSpec::Macd { .. } => IndicatorKind::Macd,
            IndicatorSpec::Bollinger { .. } => IndicatorKind::BollingerBands,
            IndicatorSpec::Atr { .. } => IndicatorKind::Atr,
            IndicatorSpec::Stochastic { .. } => IndicatorKind::Stochastic,
            IndicatorSpec::Adx { .. } => IndicatorKind::Adx,
            IndicatorSpec::Volume => IndicatorKind::Volume,
            IndicatorSpec::Price { .. } => IndicatorKind::Price,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator: IndicatorSpec,
    pub values: Vec<Sample>,
}

impl IndicatorSeries {
    pub fn latest(&self) -> Option<f64> {
        series_math::latest(&self.values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Compute the series described by `spec` over `series`.
pub fn calculate(series: &Series, spec: &IndicatorSpec) -> IndicatorSeries {
    match *spec {
        IndicatorSpec::Sma { period } => sma::calculate_sma(series, period),
        IndicatorSpec::Ema { period } => ema::calculate_ema(series, period),
        IndicatorSpec::Rsi { period } => rsi::calculate_rsi(series, period),
        IndicatorSpec::Macd {
            fast,
            slow,
            signal,
            line,
        } => macd::calculate_macd(series, fast, slow, signal, line),
        IndicatorSpec::Bollinger {
            period,
            std_dev,
            band,
        } => bollinger::calculate_bollinger(series, period, std_dev, band),
        IndicatorSpec::Atr { period } => atr::calculate_atr(series, period),
        IndicatorSpec::Stochastic {
            k_period,
            d_period,
            line,
        } => stochastic::calculate_stochastic(series, k_period, d_period, line),
        IndicatorSpec::Adx { period } => adx::calculate_adx(series, period),
        IndicatorSpec::Volume => IndicatorSeries {
            indicator: spec.clone(),
            values: series_math::defined(&series.volumes()),
        },
        IndicatorSpec::Price { field } => IndicatorSeries {
            indicator: spec.clone(),
            values: series_math::defined(&series.field(field)),
        },
    }
}

impl fmt::Display for MacdLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacdLine::Macd => write!(f, "macd"),
            MacdLine::Signal => write!(f, "signal"),
            MacdLine::Histogram => write!(f, "histogram"),
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Upper => write!(f, "upper"),
            Band::Middle => write!(f, "middle"),
            Band::Lower => write!(f, "lower"),
        }
    }
}

impl fmt::Display for StochasticLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StochasticLine::K => write!(f, "k"),
            StochasticLine::D => write!(f, "d"),
        }
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorSpec::Sma { period } => write!(f, "SMA({})", period),
            IndicatorSpec::Ema { period } => write!(f, "EMA({})", period),
            IndicatorSpec::Rsi { period } => write!(f, "RSI({})", period),
            IndicatorSpec::Macd {
                fast,
                slow,
                signal,
                line,
            } => write!(f, "MACD({},{},{}).{}", fast, slow, signal, line),
            IndicatorSpec::Bollinger {
                period,
                std_dev,
                band,
            } => write!(f, "BOLLINGER({},{}).{}", period, std_dev, band),
            IndicatorSpec::Atr { period } => write!(f, "ATR({})", period),
            IndicatorSpec::Stochastic {
                k_period,
                d_period,
                line,
            } => write!(f, "STOCHASTIC({},{}).{}", k_period, d_period, line),
            IndicatorSpec::Adx { period } => write!(f, "ADX({})", period),
            IndicatorSpec::Volume => write!(f, "VOLUME"),
            IndicatorSpec::Price { field } => write!(f, "PRICE({})", field.name()),
        }
    }
}
