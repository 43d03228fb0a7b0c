//! ZigZag extraction of alternating peaks and troughs.
//!
//! A single left-to-right pass keeps a running extreme and its direction
//! (initially rising). Moves in the current direction extend the extreme;
//! a move against it of at least `min_retrace_pct` percent of the extreme
//! emits the extreme as a point and flips the direction. The final running
//! extreme is never emitted because no reversal has confirmed it.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Peak,
    Trough,
}

impl Direction {
    /// +1 for peaks, -1 for troughs.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Peak => 1.0,
            Direction::Trough => -1.0,
        }
    }

    fn flip(self) -> Self {
        match self {
            Direction::Peak => Direction::Trough,
            Direction::Trough => Direction::Peak,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZigZagPoint {
    /// Position in the source slice.
    pub index: usize,
    pub value: f64,
    pub direction: Direction,
}

pub const DEFAULT_MIN_RETRACE_PCT: f64 = 0.1;

pub fn extract(values: &[f64], min_retrace_pct: f64) -> Vec<ZigZagPoint> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };

    let mut points = Vec::new();
    let mut cur_val = first;
    let mut cur_pos = 0;
    let mut cur_dir = Direction::Peak;

    for (i, &v) in values.iter().enumerate() {
        if (v - cur_val) * cur_dir.sign() >= 0.0 {
            cur_val = v;
            cur_pos = i;
            continue;
        }
        if cur_val == 0.0 {
            continue;
        }
        let retrace_pct = ((v - cur_val) / cur_val * 100.0).abs();
        if retrace_pct >= min_retrace_pct {
            points.push(ZigZagPoint {
                index: cur_pos,
                value: cur_val,
                direction: cur_dir,
            });
            cur_val = v;
            cur_pos = i;
            cur_dir = cur_dir.flip();
        }
    }

    points
}

/// Highest peak among the extracted points, if any peak was confirmed.
pub fn highest_peak(points: &[ZigZagPoint]) -> Option<f64> {
    points
        .iter()
        .filter(|p| p.direction == Direction::Peak)
        .map(|p| p.value)
        .reduce(f64::max)
}
