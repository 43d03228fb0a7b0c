//! OHLCV bar and series representation.

use crate::domain::error::ScanError;

pub const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Raw price field selector used by `PRICE` indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
}

impl PriceField {
    pub fn of(self, bar: &Bar) -> f64 {
        match self {
            PriceField::Open => bar.open,
            PriceField::High => bar.high,
            PriceField::Low => bar.low,
            PriceField::Close => bar.close,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
        }
    }
}

/// Time-ordered bars for one instrument, index 0 = oldest.
///
/// Read-only once built; timestamps never decrease and every price is finite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    pub fn new(bars: Vec<Bar>) -> Result<Self, ScanError> {
        for (index, bar) in bars.iter().enumerate() {
            if [bar.open, bar.high, bar.low, bar.close]
                .iter()
                .any(|v| !v.is_finite())
            {
                return Err(ScanError::InvalidBar {
                    index,
                    reason: "non-finite price".into(),
                });
            }
            if index > 0 && bar.timestamp < bars[index - 1].timestamp {
                return Err(ScanError::UnorderedSeries { index });
            }
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.field(PriceField::Close)
    }

    pub fn highs(&self) -> Vec<f64> {
        self.field(PriceField::High)
    }

    pub fn lows(&self) -> Vec<f64> {
        self.field(PriceField::Low)
    }

    pub fn field(&self, field: PriceField) -> Vec<f64> {
        self.bars.iter().map(|b| field.of(b)).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }

    /// Bars within `days` calendar days of the last bar, inclusive.
    pub fn trailing_days(&self, days: u32) -> Series {
        let Some(last) = self.bars.last() else {
            return Series::default();
        };
        let cutoff = last.timestamp - i64::from(days) * SECONDS_PER_DAY;
        let start = self.bars.partition_point(|b| b.timestamp < cutoff);
        Series {
            bars: self.bars[start..].to_vec(),
        }
    }
}
