//! RSI (Relative Strength Index) indicator implementation.
//!
//! Average gain and loss are simple rolling means of the close-to-close
//! changes (losses as absolute values). The first bar has no predecessor and
//! counts as zero movement.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100.
//! If both are zero there is no movement to measure and RSI is undefined.
//!
//! Warmup: first (n-1) bars are undefined.

use crate::domain::indicator::{IndicatorSeries, IndicatorSpec};
use crate::domain::ohlcv::Series;
use crate::domain::series_math::{rolling_mean, Sample};

pub fn calculate_rsi(series: &Series, period: usize) -> IndicatorSeries {
    let closes = series.closes();
    let mut gains: Vec<Sample> = Vec::with_capacity(closes.len());
    let mut losses: Vec<Sample> = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        let change = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
        gains.push(Some(change.max(0.0)));
        losses.push(Some((-change).max(0.0)));
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    let values = avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(gain), Some(loss)) => rsi_from_averages(*gain, *loss),
            _ => None,
        })
        .collect();

    IndicatorSeries {
        indicator: IndicatorSpec::Rsi { period },
        values,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return if avg_gain > 0.0 { Some(100.0) } else { None };
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}
