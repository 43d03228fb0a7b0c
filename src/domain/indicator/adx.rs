//! Average Directional Index.
//!
//! +DM = H[i] - H[i-1], -DM = L[i-1] - L[i], each clipped to zero when negative.
//! +DI = 100 * SMA(+DM, n) / ATR(n), -DI likewise.
//! DX = 100 * |+DI - -DI| / (+DI + -DI); ADX = SMA(DX, n).
//!
//! When +DI and -DI are both zero DX is undefined at that bar, and any ADX
//! window that contains it stays undefined.

use crate::domain::indicator::atr::true_range;
use crate::domain::indicator::{IndicatorSeries, IndicatorSpec};
use crate::domain::ohlcv::Series;
use crate::domain::series_math::{rolling_mean, zip_with, Sample};

fn directional_movement(values: &[f64], rising: bool) -> Vec<Sample> {
    (0..values.len())
        .map(|i| {
            if i == 0 {
                return None;
            }
            let dm = if rising {
                values[i] - values[i - 1]
            } else {
                values[i - 1] - values[i]
            };
            Some(dm.max(0.0))
        })
        .collect()
}

pub fn calculate_adx(series: &Series, period: usize) -> IndicatorSeries {
    let plus_dm = directional_movement(&series.highs(), true);
    let minus_dm = directional_movement(&series.lows(), false);
    let atr = rolling_mean(&true_range(series), period);

    let plus_di = zip_with(&rolling_mean(&plus_dm, period), &atr, |dm, tr| 100.0 * dm / tr);
    let minus_di = zip_with(&rolling_mean(&minus_dm, period), &atr, |dm, tr| {
        100.0 * dm / tr
    });
    let dx = zip_with(&plus_di, &minus_di, |p, m| 100.0 * (p - m).abs() / (p + m));

    IndicatorSeries {
        indicator: IndicatorSpec::Adx { period },
        values: rolling_mean(&dx, period),
    }
}
