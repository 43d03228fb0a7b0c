//! Condition data structures.
//!
//! A `Condition` compares the latest value of one indicator against either a
//! second indicator or a static value, or checks whether the first indicator
//! crossed the second on the most recent bar.

use crate::domain::error::ScanError;
use crate::domain::indicator::IndicatorSpec;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    GreaterThan,
    LessThan,
    Equals,
    GreaterEqual,
    LessEqual,
    CrossesAbove,
    CrossesBelow,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::Equals => "==",
            Operator::GreaterEqual => ">=",
            Operator::LessEqual => "<=",
            Operator::CrossesAbove => "CROSSES_ABOVE",
            Operator::CrossesBelow => "CROSSES_BELOW",
        }
    }

    pub fn is_crossover(self) -> bool {
        matches!(self, Operator::CrossesAbove | Operator::CrossesBelow)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub indicator1: IndicatorSpec,
    pub operator: Operator,
    pub indicator2: Option<IndicatorSpec>,
    pub value: Option<f64>,
}

impl Condition {
    pub fn against_value(indicator: IndicatorSpec, operator: Operator, value: f64) -> Self {
        Self {
            indicator1: indicator,
            operator,
            indicator2: None,
            value: Some(value),
        }
    }

    pub fn against_indicator(
        indicator: IndicatorSpec,
        operator: Operator,
        other: IndicatorSpec,
    ) -> Self {
        Self {
            indicator1: indicator,
            operator,
            indicator2: Some(other),
            value: None,
        }
    }

    /// Check the operand invariant: crossovers need `indicator2`, every other
    /// operator needs exactly one of `indicator2` and `value`.
    ///
    /// Evaluation never calls this; a malformed condition simply evaluates
    /// to false. Definition loaders use it to reject bad input early.
    pub fn validate(&self) -> Result<(), ScanError> {
        match (self.operator.is_crossover(), &self.indicator2, self.value) {
            (true, None, _) => Err(ScanError::ConditionInvalid {
                reason: format!("{} requires a second indicator", self.operator),
            }),
            (true, Some(_), Some(_)) => Err(ScanError::ConditionInvalid {
                reason: format!("{} does not take a static value", self.operator),
            }),
            (false, Some(_), Some(_)) => Err(ScanError::ConditionInvalid {
                reason: "condition has both a second indicator and a static value".into(),
            }),
            (false, None, None) => Err(ScanError::ConditionInvalid {
                reason: format!("{} requires a second indicator or a value", self.operator),
            }),
            (_, _, Some(v)) if !v.is_finite() => Err(ScanError::ConditionInvalid {
                reason: "static value must be finite".into(),
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.indicator1, self.operator)?;
        if let Some(other) = &self.indicator2 {
            write!(f, " {}", other)?;
        } else if let Some(value) = self.value {
            write!(f, " {}", value)?;
        }
        Ok(())
    }
}
