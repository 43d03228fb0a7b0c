//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the sample standard deviation (divides by N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use crate::domain::indicator::{Band, IndicatorSeries, IndicatorSpec};
use crate::domain::ohlcv::Series;
use crate::domain::series_math::{defined, rolling_mean, rolling_std, zip_with};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_STD_DEV: f64 = 2.0;

pub fn calculate_bollinger(
    series: &Series,
    period: usize,
    std_dev: f64,
    band: Band,
) -> IndicatorSeries {
    let closes = defined(&series.closes());
    let middle = rolling_mean(&closes, period);

    let values = match band {
        Band::Middle => middle,
        Band::Upper => zip_with(&middle, &rolling_std(&closes, period), |m, s| {
            m + std_dev * s
        }),
        Band::Lower => zip_with(&middle, &rolling_std(&closes, period), |m, s| {
            m - std_dev * s
        }),
    };

    IndicatorSeries {
        indicator: IndicatorSpec::Bollinger {
            period,
            std_dev,
            band,
        },
        values,
    }
}
