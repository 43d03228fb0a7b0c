//! Configuration validation.
//!
//! Validates the `[scan]` section and `[strategy.<id>]` definitions before a
//! scan runs, so a bad config fails fast with the offending section and key.

use crate::domain::condition_parser::parse_condition;
use crate::domain::error::ScanError;
use crate::domain::scan::{ScanOptions, DEFAULT_MAX_WORKERS};
use crate::domain::strategy::{Strategy, DEFAULT_TIMEFRAME};
use crate::domain::universe::parse_symbols;
use crate::ports::config_port::ConfigPort;

pub const SCAN_SECTION: &str = "scan";
pub const STRATEGY_SECTION_PREFIX: &str = "strategy.";

pub fn validate_scan_config(config: &dyn ConfigPort) -> Result<(), ScanError> {
    validate_data_dir(config)?;
    validate_symbols(config)?;
    validate_parallel(config)?;
    validate_max_workers(config)?;
    Ok(())
}

/// Worker pool settings from `[scan]`; call after [`validate_scan_config`].
pub fn scan_options(config: &dyn ConfigPort) -> ScanOptions {
    ScanOptions {
        parallel: config.get_bool(SCAN_SECTION, "parallel", false),
        max_workers: config
            .get_int(SCAN_SECTION, "max_workers", DEFAULT_MAX_WORKERS as i64)
            .max(1) as usize,
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> ScanError {
    ScanError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), ScanError> {
    match config.get_string(SCAN_SECTION, "data_dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(ScanError::ConfigMissing {
            section: SCAN_SECTION.to_string(),
            key: "data_dir".to_string(),
        }),
    }
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), ScanError> {
    match config.get_string(SCAN_SECTION, "symbols") {
        Some(s) => parse_symbols(&s)
            .map(|_| ())
            .map_err(|e| invalid(SCAN_SECTION, "symbols", e.to_string())),
        None => Ok(()),
    }
}

fn validate_parallel(config: &dyn ConfigPort) -> Result<(), ScanError> {
    match config.get_string(SCAN_SECTION, "parallel") {
        Some(s) if !matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "1" | "false" | "no" | "0"
        ) =>
        {
            Err(invalid(SCAN_SECTION, "parallel", "parallel must be true or false"))
        }
        _ => Ok(()),
    }
}

fn validate_max_workers(config: &dyn ConfigPort) -> Result<(), ScanError> {
    let Some(raw) = config.get_string(SCAN_SECTION, "max_workers") else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 => Ok(()),
        _ => Err(invalid(
            SCAN_SECTION,
            "max_workers",
            "max_workers must be an integer of at least 1",
        )),
    }
}

/// Ids of every `[strategy.<id>]` section, sorted.
pub fn strategy_ids(config: &dyn ConfigPort) -> Vec<String> {
    let mut ids: Vec<String> = config
        .sections()
        .into_iter()
        .filter_map(|s| s.strip_prefix(STRATEGY_SECTION_PREFIX).map(str::to_string))
        .filter(|id| !id.is_empty())
        .collect();
    ids.sort();
    ids
}

pub fn validate_strategy_section(config: &dyn ConfigPort, id: &str) -> Result<(), ScanError> {
    strategy_from_config(config, id).map(|_| ())
}

/// Build the strategy defined in `[strategy.<id>]`.
///
/// Conditions are read from `condition1`, `condition2`, ... in order; the
/// numbering must be contiguous. Every condition must parse and satisfy the
/// operand rules of [`Condition::validate`](crate::domain::condition::Condition::validate).
pub fn strategy_from_config(config: &dyn ConfigPort, id: &str) -> Result<Strategy, ScanError> {
    let section = format!("{}{}", STRATEGY_SECTION_PREFIX, id);
    if !config.sections().iter().any(|s| *s == section.to_lowercase()) {
        return Err(ScanError::UnknownStrategy(id.to_string()));
    }

    let name = match config.get_string(&section, "name") {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => {
            return Err(ScanError::ConfigMissing {
                section,
                key: "name".to_string(),
            });
        }
    };
    let description = config
        .get_string(&section, "description")
        .unwrap_or_default()
        .trim()
        .to_string();
    let timeframe = match config.get_string(&section, "timeframe") {
        None => DEFAULT_TIMEFRAME.to_string(),
        Some(s) if is_timeframe(s.trim()) => s.trim().to_string(),
        Some(s) => {
            return Err(invalid(
                &section,
                "timeframe",
                format!("'{}' is not a timeframe such as 5m, 1h, 1D or 1W", s.trim()),
            ));
        }
    };

    let mut numbered: Vec<(usize, String)> = config
        .keys(&section)
        .into_iter()
        .filter_map(|k| {
            let n = k.strip_prefix("condition")?.parse::<usize>().ok()?;
            Some((n, k))
        })
        .collect();
    numbered.sort_unstable();
    if let Some((i, (_, key))) = numbered.iter().enumerate().find(|(i, (n, _))| *n != i + 1) {
        let expected = i + 1;
        return Err(invalid(
            &section,
            key,
            format!("conditions must be numbered from 1 without gaps, expected condition{}", expected),
        ));
    }

    let mut conditions = Vec::with_capacity(numbered.len());
    for (_, key) in numbered {
        let text = config.get_string(&section, &key).unwrap_or_default();
        let condition = parse_condition(&text).map_err(|e| {
            tracing::error!(%section, %key, "{}", e.display_with_context(&text));
            ScanError::ConditionParse(e)
        })?;
        condition.validate().map_err(|e| match e {
            ScanError::ConditionInvalid { reason } => ScanError::ConditionInvalid {
                reason: format!("[{}] {}: {}", section, key, reason),
            },
            other => other,
        })?;
        conditions.push(condition);
    }

    if conditions.is_empty() {
        tracing::warn!(strategy = %id, "strategy has no conditions and will match every symbol");
    }

    Ok(Strategy {
        id: id.to_string(),
        name,
        description,
        conditions,
        timeframe,
    })
}

/// A positive count followed by a unit: m, h, D, W or M.
fn is_timeframe(s: &str) -> bool {
    let Some(unit) = s.chars().last() else {
        return false;
    };
    let count = &s[..s.len() - unit.len_utf8()];
    matches!(unit, 'm' | 'h' | 'D' | 'W' | 'M')
        && !count.is_empty()
        && count.chars().all(|c| c.is_ascii_digit())
        && count.parse::<u32>().is_ok_and(|n| n > 0)
}
