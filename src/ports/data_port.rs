//! Market data access port.

use crate::domain::error::ScanError;
use crate::domain::ohlcv::Series;

pub trait DataPort {
    /// Full stored history for `symbol`, oldest bar first.
    fn fetch_series(&self, symbol: &str) -> Result<Series, ScanError>;

    fn list_symbols(&self) -> Result<Vec<String>, ScanError>;
}
