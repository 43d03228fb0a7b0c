//! Numeric primitives shared by every indicator.
//!
//! Every output sample is a [`Sample`]: `None` marks an undefined value
//! (warm-up, undefined input inside the window, degenerate arithmetic).
//! Undefined inputs always propagate; nothing here returns NaN or infinity.

pub type Sample = Option<f64>;

/// Lift raw values into samples, treating non-finite values as undefined.
pub fn defined(values: &[f64]) -> Vec<Sample> {
    values
        .iter()
        .map(|&v| if v.is_finite() { Some(v) } else { None })
        .collect()
}

/// Apply `f` to each window of `window` samples ending at every position.
///
/// Positions before `window - 1`, and windows containing an undefined sample,
/// produce `None`. So does a non-finite result of `f`.
fn rolling<F>(values: &[Sample], window: usize, f: F) -> Vec<Sample>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    if window == 0 {
        return vec![None; values.len()];
    }
    let mut out = Vec::with_capacity(values.len());
    let mut buf: Vec<f64> = Vec::with_capacity(window);
    for i in 0..values.len() {
        if i + 1 < window {
            out.push(None);
            continue;
        }
        buf.clear();
        let complete = values[i + 1 - window..=i].iter().all(|v| match v {
            Some(x) => {
                buf.push(*x);
                true
            }
            None => false,
        });
        out.push(if complete {
            f(&buf).filter(|v| v.is_finite())
        } else {
            None
        });
    }
    out
}

pub fn rolling_mean(values: &[Sample], window: usize) -> Vec<Sample> {
    rolling(values, window, |w| Some(w.iter().sum::<f64>() / w.len() as f64))
}

/// Sample standard deviation (n - 1 divisor); undefined for a window of one.
pub fn rolling_std(values: &[Sample], window: usize) -> Vec<Sample> {
    rolling(values, window, |w| {
        if w.len() < 2 {
            return None;
        }
        let mean = w.iter().sum::<f64>() / w.len() as f64;
        let var = w.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (w.len() - 1) as f64;
        Some(var.sqrt())
    })
}

pub fn rolling_min(values: &[Sample], window: usize) -> Vec<Sample> {
    rolling(values, window, |w| w.iter().copied().reduce(f64::min))
}

pub fn rolling_max(values: &[Sample], window: usize) -> Vec<Sample> {
    rolling(values, window, |w| w.iter().copied().reduce(f64::max))
}

/// Recursive exponential smoothing, α = 2/(span+1), seeded by the first
/// defined sample.
///
/// Leading undefined samples stay undefined; a gap after the seed carries the
/// previous smoothed value forward.
pub fn ema(values: &[Sample], span: usize) -> Vec<Sample> {
    if span == 0 {
        return vec![None; values.len()];
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut state: Option<f64> = None;
    values
        .iter()
        .map(|v| {
            state = match (state, v) {
                (None, Some(x)) => Some(*x),
                (Some(prev), Some(x)) => Some(alpha * x + (1.0 - alpha) * prev),
                (prev, None) => prev,
            };
            state
        })
        .collect()
}

/// Element-wise combination of two equally long sample vectors.
pub fn zip_with<F>(a: &[Sample], b: &[Sample], f: F) -> Vec<Sample>
where
    F: Fn(f64, f64) -> f64,
{
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some(f(*x, *y)).filter(|v| v.is_finite()),
            _ => None,
        })
        .collect()
}

/// Least-squares slope of the last `n` samples against x = 0, 1, ..., n-1.
///
/// Returns 0.0 ("flat") when fewer than `n` samples exist or fewer than two of
/// the tail samples are defined. Undefined samples inside the tail are left
/// out of the fit but keep their x position.
pub fn linear_regression_slope(values: &[Sample], n: usize) -> f64 {
    if n == 0 || values.len() < n {
        return 0.0;
    }
    let points: Vec<(f64, f64)> = values[values.len() - n..]
        .iter()
        .enumerate()
        .filter_map(|(x, v)| v.map(|y| (x as f64, y)))
        .collect();
    if points.len() < 2 {
        return 0.0;
    }
    let count = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / count;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / count;
    let mut num = 0.0;
    let mut den = 0.0;
    for (x, y) in &points {
        num += (x - mean_x) * (y - mean_y);
        den += (x - mean_x) * (x - mean_x);
    }
    if den == 0.0 {
        return 0.0;
    }
    let slope = num / den;
    if slope.is_finite() { slope } else { 0.0 }
}

/// The last sample, if the vector is non-empty and that sample is defined.
pub fn latest(values: &[Sample]) -> Option<f64> {
    values.last().copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn some(values: &[f64]) -> Vec<Sample> {
        defined(values)
    }

    #[test]
    fn rolling_mean_warmup_and_values() {
        let out = rolling_mean(&some(&[1.0, 2.0, 3.0, 4.0]), 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_relative_eq!(out[2].unwrap(), 2.0);
        assert_relative_eq!(out[3].unwrap(), 3.0);
    }

    #[test]
    fn rolling_mean_window_longer_than_input() {
        let out = rolling_mean(&some(&[1.0, 2.0]), 5);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn rolling_mean_window_one_is_identity() {
        let out = rolling_mean(&some(&[4.0, 5.0]), 1);
        assert_eq!(out, vec![Some(4.0), Some(5.0)]);
    }

    #[test]
    fn rolling_mean_propagates_undefined() {
        let input = vec![Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)];
        let out = rolling_mean(&input, 2);
        assert_eq!(out[1], None);
        assert_eq!(out[2], None);
        assert_relative_eq!(out[3].unwrap(), 3.5);
    }

    #[test]
    fn rolling_std_is_sample_std() {
        let out = rolling_std(&some(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 8);
        // population std is 2.0, sample std is sqrt(32/7)
        assert_relative_eq!(out[7].unwrap(), (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn rolling_std_window_one_undefined() {
        assert_eq!(rolling_std(&some(&[1.0, 2.0]), 1), vec![None, None]);
    }

    #[test]
    fn rolling_min_max() {
        let input = some(&[3.0, 1.0, 4.0, 1.5, 5.0]);
        let mins = rolling_min(&input, 3);
        let maxs = rolling_max(&input, 3);
        assert_eq!(mins[2], Some(1.0));
        assert_eq!(mins[4], Some(1.5));
        assert_eq!(maxs[2], Some(4.0));
        assert_eq!(maxs[4], Some(5.0));
    }

    #[test]
    fn ema_seeded_by_first_value() {
        let out = ema(&some(&[10.0, 20.0, 30.0]), 3);
        let alpha = 0.5;
        assert_relative_eq!(out[0].unwrap(), 10.0);
        let e1 = alpha * 20.0 + (1.0 - alpha) * 10.0;
        assert_relative_eq!(out[1].unwrap(), e1);
        assert_relative_eq!(out[2].unwrap(), alpha * 30.0 + (1.0 - alpha) * e1);
    }

    #[test]
    fn ema_waits_for_first_defined_value() {
        let out = ema(&[None, None, Some(5.0), None, Some(7.0)], 1);
        assert_eq!(out, vec![None, None, Some(5.0), Some(5.0), Some(7.0)]);
    }

    #[test]
    fn zip_with_degenerate_division_is_undefined() {
        let out = zip_with(&some(&[1.0, 0.0]), &some(&[0.0, 0.0]), |a, b| a / b);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn slope_of_line() {
        let out = linear_regression_slope(&some(&[1.0, 3.0, 5.0, 7.0, 9.0, 11.0]), 5);
        assert_relative_eq!(out, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn slope_short_input_is_flat() {
        assert_eq!(linear_regression_slope(&some(&[1.0, 2.0]), 5), 0.0);
    }

    #[test]
    fn slope_all_undefined_is_flat() {
        assert_eq!(linear_regression_slope(&[None; 6], 5), 0.0);
    }

    #[test]
    fn slope_skips_undefined_points() {
        let input = vec![None, None, Some(2.0), Some(4.0), Some(6.0)];
        assert_relative_eq!(linear_regression_slope(&input, 5), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn latest_sample() {
        assert_eq!(latest(&[]), None);
        assert_eq!(latest(&[Some(1.0), None]), None);
        assert_eq!(latest(&[None, Some(2.0)]), Some(2.0));
    }
}
