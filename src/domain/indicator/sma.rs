//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorSpec};
use crate::domain::ohlcv::Series;
use crate::domain::series_math::{defined, rolling_mean};

pub fn calculate_sma(series: &Series, period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator: IndicatorSpec::Sma { period },
        values: rolling_mean(&defined(&series.closes()), period),
    }
}
