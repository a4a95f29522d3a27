//! CSV file data adapter.
//!
//! Columns are located by header name, case-insensitively, so both
//! `Date,Open,...` and `date,open,...` files load. Columns other than the six
//! price/volume fields (such as `OpenInt`) are dropped here.

use crate::domain::error::StockviewError;
use crate::domain::row_store::RawRow;
use crate::ports::data_port::DataPort;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

const COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DataPort for CsvAdapter {
    fn fetch_rows(&self) -> Result<Vec<RawRow>, StockviewError> {
        let file = File::open(&self.path).map_err(|e| StockviewError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let rows = read_rows(file)?;
        debug!(path = %self.path.display(), rows = rows.len(), "read csv");
        Ok(rows)
    }

    fn source_name(&self) -> String {
        self.path.display().to_string()
    }
}

/// Reads every data row of a headered CSV into untyped rows.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>, StockviewError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| StockviewError::Data {
            reason: format!("CSV header error: {}", e),
        })?
        .clone();

    let index: Vec<Option<usize>> = COLUMNS
        .iter()
        .map(|name| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| StockviewError::Data {
            reason: format!("CSV parse error: {}", e),
        })?;
        let field = |col: usize| {
            index[col]
                .and_then(|i| record.get(i))
                .map(str::to_string)
        };
        rows.push(RawRow {
            date: field(0),
            open: field(1),
            high: field(2),
            low: field(3),
            close: field(4),
            volume: field(5),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::LoadError;
    use crate::domain::row_store::RowStore;
    use std::fs;
    use tempfile::TempDir;

    const BA_SAMPLE: &str = "Date,Open,High,Low,Close,Volume,OpenInt\n\
        1962-01-02,0.8231,0.8355,0.8231,0.8231,352350,0\n\
        1962-01-03,0.8231,0.8281,0.8136,0.8177,710775,0\n\
        1962-01-04,0.8177,0.8257,0.8136,0.8136,911033,0\n";

    fn write_csv(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ba.us.txt");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn fetch_rows_reads_all_rows_and_drops_extra_column() {
        let (_dir, path) = write_csv(BA_SAMPLE);
        let rows = CsvAdapter::new(path).fetch_rows().unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date.as_deref(), Some("1962-01-02"));
        assert_eq!(rows[0].open.as_deref(), Some("0.8231"));
        assert_eq!(rows[0].close.as_deref(), Some("0.8231"));
        assert_eq!(rows[2].volume.as_deref(), Some("911033"));
    }

    #[test]
    fn columns_are_found_by_name_in_any_order() {
        let rows = read_rows("volume,close,low,high,open,date\n5,4,3,2,1,2000-01-03\n".as_bytes())
            .unwrap();
        assert_eq!(rows[0].date.as_deref(), Some("2000-01-03"));
        assert_eq!(rows[0].open.as_deref(), Some("1"));
        assert_eq!(rows[0].volume.as_deref(), Some("5"));
    }

    #[test]
    fn missing_column_surfaces_as_load_error() {
        let csv = "Date,Open,High,Low,Close\n2000-01-03,1,2,0.5,1.5\n";
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].volume, None);
        assert_eq!(
            RowStore::load(rows).unwrap_err(),
            LoadError::MissingField {
                row: 1,
                field: "volume"
            }
        );
    }

    #[test]
    fn short_row_is_reported_not_rejected_by_reader() {
        let csv = "Date,Open,High,Low,Close,Volume\n2000-01-03,1,2\n";
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].high.as_deref(), Some("2"));
        assert_eq!(rows[0].low, None);
    }

    #[test]
    fn header_only_file_loads_as_empty() {
        let (_dir, path) = write_csv("Date,Open,High,Low,Close,Volume,OpenInt\n");
        let rows = CsvAdapter::new(path).fetch_rows().unwrap();
        assert!(rows.is_empty());
        assert_eq!(RowStore::load(rows).unwrap_err(), LoadError::Empty);
    }

    #[test]
    fn missing_file_is_a_data_error() {
        let dir = TempDir::new().unwrap();
        let result = CsvAdapter::new(dir.path().join("nope.csv")).fetch_rows();
        assert!(matches!(result, Err(StockviewError::Data { .. })));
    }
}
