//! Stochastic Oscillator.
//!
//! %K = 100 * (C - LL(k)) / (HH(k) - LL(k)), %D = SMA(%K, d).
//! A flat range (HH == LL) leaves %K undefined at that bar.

use crate::domain::indicator::{IndicatorSeries, IndicatorSpec, StochasticLine};
use crate::domain::ohlcv::Series;
use crate::domain::series_math::{defined, rolling_max, rolling_mean, rolling_min, zip_with};

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;

pub fn calculate_stochastic(
    series: &Series,
    k_period: usize,
    d_period: usize,
    line: StochasticLine,
) -> IndicatorSeries {
    let lowest = rolling_min(&defined(&series.lows()), k_period);
    let highest = rolling_max(&defined(&series.highs()), k_period);
    let range = zip_with(&highest, &lowest, |h, l| h - l);
    let above_low = zip_with(&defined(&series.closes()), &lowest, |c, l| c - l);
    let k = zip_with(&above_low, &range, |num, den| 100.0 * num / den);

    let values = match line {
        StochasticLine::K => k,
        StochasticLine::D => rolling_mean(&k, d_period),
    };

    IndicatorSeries {
        indicator: IndicatorSpec::Stochastic {
            k_period,
            d_period,
            line,
        },
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::{flat_bars, hlc_bars};
    use approx::assert_relative_eq;

    #[test]
    fn stochastic_k_at_top_of_range() {
        let series = hlc_bars(&[(10.0, 5.0, 6.0), (12.0, 6.0, 8.0), (14.0, 7.0, 14.0)]);
        let k = calculate_stochastic(&series, 3, 3, StochasticLine::K);
        assert_relative_eq!(k.latest().unwrap(), 100.0);
    }

    #[test]
    fn stochastic_k_midpoint() {
        let series = hlc_bars(&[(10.0, 0.0, 5.0), (10.0, 0.0, 5.0)]);
        let k = calculate_stochastic(&series, 2, 1, StochasticLine::K);
        assert!(k.values[0].is_none());
        assert_relative_eq!(k.latest().unwrap(), 50.0);
    }

    #[test]
    fn stochastic_d_is_mean_of_k() {
        let series = hlc_bars(&[
            (10.0, 0.0, 2.0),
            (10.0, 0.0, 4.0),
            (10.0, 0.0, 6.0),
            (10.0, 0.0, 8.0),
        ]);
        let d = calculate_stochastic(&series, 2, 2, StochasticLine::D);
        // %K at bars 1..=3 = 40, 60, 80
        assert!(d.values[1].is_none());
        assert_relative_eq!(d.values[2].unwrap(), 50.0);
        assert_relative_eq!(d.values[3].unwrap(), 70.0);
    }

    #[test]
    fn stochastic_flat_range_is_undefined() {
        let series = flat_bars(&[100.0; 6]);
        let k = calculate_stochastic(&series, 3, 3, StochasticLine::K);
        assert!(k.values.iter().all(Option::is_none));
        let d = calculate_stochastic(&series, 3, 3, StochasticLine::D);
        assert!(d.values.iter().all(Option::is_none));
    }
}
