//! Average True Range indicator.
//!
//! TR[0] = high - low (no previous close); TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! ATR(n) = rolling mean of TR over n bars. Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorSpec};
use crate::domain::ohlcv::Series;
use crate::domain::series_math::{rolling_mean, Sample};

pub fn true_range(series: &Series) -> Vec<Sample> {
    let bars = series.bars();
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let tr = if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            };
            Some(tr)
        })
        .collect()
}

pub fn calculate_atr(series: &Series, period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator: IndicatorSpec::Atr { period },
        values: rolling_mean(&true_range(series), period),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::hlc_bars;
    use approx::assert_relative_eq;

    #[test]
    fn atr_basic() {
        let series = hlc_bars(&[(110.0, 90.0, 100.0); 5]);
        let atr = calculate_atr(&series, 3);
        assert_eq!(atr.values.len(), 5);
        assert!(atr.values[0].is_none());
        assert!(atr.values[1].is_none());
        assert!(atr.values[2..].iter().all(Option::is_some));
        assert_relative_eq!(atr.latest().unwrap(), 20.0);
    }

    #[test]
    fn first_true_range_is_high_minus_low() {
        let series = hlc_bars(&[(110.0, 100.0, 105.0), (130.0, 120.0, 125.0)]);
        let tr = true_range(&series);
        assert_eq!(tr[0], Some(10.0));
        // gap up: |130 - 105| = 25
        assert_eq!(tr[1], Some(25.0));
    }

    #[test]
    fn atr_is_simple_average_of_true_range() {
        let series = hlc_bars(&[
            (110.0, 100.0, 105.0),
            (115.0, 105.0, 110.0),
            (120.0, 110.0, 115.0),
            (140.0, 115.0, 120.0),
        ]);
        let atr = calculate_atr(&series, 3);
        assert_relative_eq!(atr.values[2].unwrap(), 10.0);
        assert_relative_eq!(atr.values[3].unwrap(), (10.0 + 10.0 + 25.0) / 3.0);
    }

    #[test]
    fn atr_insufficient_bars() {
        let series = hlc_bars(&[(110.0, 90.0, 100.0); 2]);
        let atr = calculate_atr(&series, 5);
        assert!(atr.values.iter().all(Option::is_none));
    }
}
