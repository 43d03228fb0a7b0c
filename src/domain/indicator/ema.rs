//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first close, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Defined from the first bar; there is no warmup gap.

use crate::domain::indicator::{IndicatorSeries, IndicatorSpec};
use crate::domain::ohlcv::Series;
use crate::domain::series_math::{defined, ema};

pub fn calculate_ema(series: &Series, period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator: IndicatorSpec::Ema { period },
        values: ema(&defined(&series.closes()), period),
    }
}
