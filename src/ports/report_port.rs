//! Report generation port trait.

use crate::domain::error::ScanError;
use crate::domain::scan::ScanResult;

/// Port for writing ranked scan results.
pub trait ReportPort {
    fn write(&self, results: &[ScanResult], output_path: &str) -> Result<(), ScanError>;
}
