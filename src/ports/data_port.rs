//! Data access port trait.

use crate::domain::error::StockviewError;
use crate::domain::row_store::RawRow;

/// A source of untyped rows for the single dataset this service exposes.
pub trait DataPort {
    fn fetch_rows(&self) -> Result<Vec<RawRow>, StockviewError>;

    /// Human-readable origin, used in log lines.
    fn source_name(&self) -> String;
}
