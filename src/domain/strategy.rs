//! User-defined strategy: an ordered AND of conditions.

use crate::domain::condition::Condition;

pub const DEFAULT_TIMEFRAME: &str = "1D";

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Evaluation order; only affects the positional `conditions_met` report.
    pub conditions: Vec<Condition>,
    /// Bar resolution label such as "5m", "1h" or "1D". Not interpreted here.
    pub timeframe: String,
}

/// History window used when a timeframe has no entry of its own.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 90;

impl Strategy {
    /// Calendar days of history to scan for this strategy's timeframe.
    pub fn lookback_days(&self) -> u32 {
        match self.timeframe.as_str() {
            "5m" => 30,
            "15m" | "30m" => 90,
            "1h" => 180,
            "2h" | "4h" | "1D" => 365,
            "1W" => 730,
            _ => DEFAULT_LOOKBACK_DAYS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::Operator;
    use crate::domain::indicator::IndicatorSpec;

    fn sample_strategy() -> Strategy {
        Strategy {
            id: "golden".into(),
            name: "Golden Cross".into(),
            description: "SMA(50) crossing above SMA(200)".into(),
            conditions: vec![Condition::against_indicator(
                IndicatorSpec::Sma { period: 50 },
                Operator::CrossesAbove,
                IndicatorSpec::Sma { period: 200 },
            )],
            timeframe: DEFAULT_TIMEFRAME.into(),
        }
    }

    #[test]
    fn strategy_fields() {
        let s = sample_strategy();
        assert_eq!(s.id, "golden");
        assert_eq!(s.name, "Golden Cross");
        assert_eq!(s.conditions.len(), 1);
        assert_eq!(s.timeframe, "1D");
    }

    #[test]
    fn lookback_follows_timeframe() {
        let mut s = sample_strategy();
        assert_eq!(s.lookback_days(), 365);
        s.timeframe = "5m".into();
        assert_eq!(s.lookback_days(), 30);
        s.timeframe = "1W".into();
        assert_eq!(s.lookback_days(), 730);
        s.timeframe = "3D".into();
        assert_eq!(s.lookback_days(), DEFAULT_LOOKBACK_DAYS);
    }
}
