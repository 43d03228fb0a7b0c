//! Condition and strategy evaluation.
//!
//! # Evaluation Semantics
//!
//! - Every condition looks at the latest bar only.
//! - An undefined latest value of `indicator1` (short history, degenerate
//!   arithmetic) makes the condition false.
//! - `CROSSES_ABOVE`/`CROSSES_BELOW`: delegate to the crossover detectors on
//!   the full series of both indicators; no `indicator2` means false.
//! - Comparisons use `indicator2`'s latest value when present, otherwise the
//!   static value; an undefined or missing operand means false.
//! - `==` is a tolerance test, `|a - b| < 0.01`.
//! - A strategy matches when every condition holds; zero conditions match.

use crate::domain::condition::{Condition, Operator};
use crate::domain::indicator::{self, check_crossover, check_crossunder};
use crate::domain::ohlcv::Series;
use crate::domain::strategy::Strategy;
use std::collections::BTreeMap;

pub const EQUALS_TOLERANCE: f64 = 0.01;

/// Verdict for one condition plus the latest indicator values it resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionOutcome {
    pub met: bool,
    pub indicator1: Option<f64>,
    pub indicator2: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyEvaluation {
    pub matched: bool,
    pub conditions_met: Vec<bool>,
    pub indicator_values: BTreeMap<String, f64>,
}

pub fn evaluate_condition(series: &Series, condition: &Condition) -> bool {
    evaluate_condition_detailed(series, condition).met
}

pub fn evaluate_condition_detailed(series: &Series, condition: &Condition) -> ConditionOutcome {
    let first = indicator::calculate(series, &condition.indicator1);
    let second = condition
        .indicator2
        .as_ref()
        .map(|spec| indicator::calculate(series, spec));

    let indicator1 = first.latest();
    let indicator2 = second.as_ref().and_then(|s| s.latest());
    let outcome = |met| ConditionOutcome {
        met,
        indicator1,
        indicator2,
    };

    let Some(left) = indicator1 else {
        return outcome(false);
    };

    match condition.operator {
        Operator::CrossesAbove | Operator::CrossesBelow => {
            let Some(second) = &second else {
                return outcome(false);
            };
            let crossed = if condition.operator == Operator::CrossesAbove {
                check_crossover(&first.values, &second.values)
            } else {
                check_crossunder(&first.values, &second.values)
            };
            outcome(crossed)
        }
        op => {
            let right = match &second {
                Some(_) => indicator2,
                None => condition.value,
            };
            match right {
                Some(right) => outcome(compare(op, left, right)),
                None => outcome(false),
            }
        }
    }
}

fn compare(operator: Operator, left: f64, right: f64) -> bool {
    match operator {
        Operator::GreaterThan => left > right,
        Operator::LessThan => left < right,
        Operator::Equals => (left - right).abs() < EQUALS_TOLERANCE,
        Operator::GreaterEqual => left >= right,
        Operator::LessEqual => left <= right,
        Operator::CrossesAbove | Operator::CrossesBelow => false,
    }
}

/// Evaluate every condition in order and AND the results.
///
/// `indicator_values` holds the defined latest values, keyed
/// `condition_<i>_indicator1` / `condition_<i>_indicator2`.
pub fn evaluate_strategy(series: &Series, strategy: &Strategy) -> StrategyEvaluation {
    let mut conditions_met = Vec::with_capacity(strategy.conditions.len());
    let mut indicator_values = BTreeMap::new();

    for (i, condition) in strategy.conditions.iter().enumerate() {
        let outcome = evaluate_condition_detailed(series, condition);
        conditions_met.push(outcome.met);
        if let Some(v) = outcome.indicator1 {
            indicator_values.insert(format!("condition_{}_indicator1", i), v);
        }
        if let Some(v) = outcome.indicator2 {
            indicator_values.insert(format!("condition_{}_indicator2", i), v);
        }
    }

    StrategyEvaluation {
        matched: conditions_met.iter().all(|met| *met),
        conditions_met,
        indicator_values,
    }
}
