//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Every line is defined from the first bar (the EMAs are seeded, not warmed up).

use crate::domain::indicator::{IndicatorSeries, IndicatorSpec, MacdLine};
use crate::domain::ohlcv::Series;
use crate::domain::series_math::{defined, ema, zip_with, Sample};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

/// All three MACD lines, one sample per bar.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<Sample>,
    pub signal: Vec<Sample>,
    pub histogram: Vec<Sample>,
}

pub fn macd_lines(series: &Series, fast: usize, slow: usize, signal: usize) -> MacdLines {
    let closes = defined(&series.closes());
    let macd = zip_with(&ema(&closes, fast), &ema(&closes, slow), |f, s| f - s);
    let signal_line = ema(&macd, signal);
    let histogram = zip_with(&macd, &signal_line, |m, s| m - s);
    MacdLines {
        macd,
        signal: signal_line,
        histogram,
    }
}

pub fn calculate_macd(
    series: &Series,
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
) -> IndicatorSeries {
    let lines = macd_lines(series, fast, slow, signal);
    let values = match line {
        MacdLine::Macd => lines.macd,
        MacdLine::Signal => lines.signal,
        MacdLine::Histogram => lines.histogram,
    };
    IndicatorSeries {
        indicator: IndicatorSpec::Macd {
            fast,
            slow,
            signal,
            line,
        },
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::flat_bars;
    use approx::assert_relative_eq;

    fn rising(n: usize) -> Series {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        flat_bars(&closes)
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let lines = macd_lines(&rising(40), DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL);
        for i in 0..40 {
            let (m, s, h) = (
                lines.macd[i].unwrap(),
                lines.signal[i].unwrap(),
                lines.histogram[i].unwrap(),
            );
            assert_relative_eq!(h, m - s, epsilon = 1e-12);
        }
    }

    #[test]
    fn macd_line_is_ema_fast_minus_ema_slow() {
        let series = rising(10);
        let closes = defined(&series.closes());
        let fast = ema(&closes, 3);
        let slow = ema(&closes, 5);
        let out = calculate_macd(&series, 3, 5, 2, MacdLine::Macd);
        for i in 0..10 {
            assert_relative_eq!(
                out.values[i].unwrap(),
                fast[i].unwrap() - slow[i].unwrap(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn macd_starts_at_zero() {
        let out = calculate_macd(&rising(5), 12, 26, 9, MacdLine::Macd);
        assert_relative_eq!(out.values[0].unwrap(), 0.0);
    }

    #[test]
    fn macd_positive_in_uptrend() {
        let out = calculate_macd(&rising(60), 12, 26, 9, MacdLine::Macd);
        assert!(out.latest().unwrap() > 0.0);
    }

    #[test]
    fn macd_line_selector() {
        let series = rising(30);
        let lines = macd_lines(&series, 12, 26, 9);
        let signal = calculate_macd(&series, 12, 26, 9, MacdLine::Signal);
        let histogram = calculate_macd(&series, 12, 26, 9, MacdLine::Histogram);
        assert_eq!(signal.values, lines.signal);
        assert_eq!(histogram.values, lines.histogram);
    }

    #[test]
    fn macd_empty_bars() {
        let out = calculate_macd(&flat_bars(&[]), 12, 26, 9, MacdLine::Macd);
        assert!(out.values.is_empty());
    }

    #[test]
    fn macd_zero_period_is_undefined() {
        let out = calculate_macd(&rising(5), 0, 26, 9, MacdLine::Macd);
        assert!(out.values.iter().all(Option::is_none));
    }
}
