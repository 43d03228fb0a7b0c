//! CSV scan report adapter.
//!
//! One row per result in the order given. `conditions_met` is written as
//! `true;false;...` and `indicator_values` as `key=value;...` in key order.

use crate::domain::error::ScanError;
use crate::domain::scan::ScanResult;
use crate::ports::report_port::ReportPort;
use chrono::SecondsFormat;

pub const HEADER: [&str; 7] = [
    "symbol",
    "display_name",
    "matched",
    "conditions_met",
    "current_price",
    "indicator_values",
    "timestamp",
];

pub struct CsvReportAdapter;

fn report_error(output_path: &str, e: impl std::fmt::Display) -> ScanError {
    ScanError::Io(std::io::Error::other(format!(
        "failed to write report {}: {}",
        output_path, e
    )))
}

fn format_conditions(conditions: &[bool]) -> String {
    conditions
        .iter()
        .map(|met| met.to_string())
        .collect::<Vec<_>>()
        .join(";")
}

fn format_values(result: &ScanResult) -> String {
    result
        .indicator_values
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(";")
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, results: &[ScanResult], output_path: &str) -> Result<(), ScanError> {
        let mut writer =
            csv::Writer::from_path(output_path).map_err(|e| report_error(output_path, e))?;
        writer
            .write_record(HEADER)
            .map_err(|e| report_error(output_path, e))?;

        for result in results {
            writer
                .write_record([
                    result.symbol.clone(),
                    result.display_name.clone(),
                    result.matched.to_string(),
                    format_conditions(&result.conditions_met),
                    format!("{:.2}", result.current_price),
                    format_values(result),
                    result.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                ])
                .map_err(|e| report_error(output_path, e))?;
        }

        writer.flush()?;
        tracing::info!(rows = results.len(), path = %output_path, "report written");
        Ok(())
    }
}
