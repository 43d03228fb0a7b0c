//! Crossover edge detection on the two most recent samples.
//!
//! Only `a[-2], b[-2], a[-1], b[-1]` are inspected. All four must be defined;
//! otherwise there is no crossing.

use crate::domain::series_math::Sample;

fn last_two(values: &[Sample]) -> Option<(f64, f64)> {
    match values {
        [.., Some(prev), Some(curr)] => Some((*prev, *curr)),
        _ => None,
    }
}

/// `a` crosses above `b` on the latest bar: a[-2] <= b[-2] and a[-1] > b[-1].
pub fn check_crossover(a: &[Sample], b: &[Sample]) -> bool {
    match (last_two(a), last_two(b)) {
        (Some((a_prev, a_curr)), Some((b_prev, b_curr))) => a_prev <= b_prev && a_curr > b_curr,
        _ => false,
    }
}

/// `a` crosses below `b` on the latest bar: a[-2] >= b[-2] and a[-1] < b[-1].
pub fn check_crossunder(a: &[Sample], b: &[Sample]) -> bool {
    match (last_two(a), last_two(b)) {
        (Some((a_prev, a_curr)), Some((b_prev, b_curr))) => a_prev >= b_prev && a_curr < b_curr,
        _ => false,
    }
}
