//! In-memory dataset built from untyped loader rows.
//!
//! The loader hands over string fields exactly as read; this module owns the
//! parsing rules so every data source is validated the same way. A load either
//! produces a complete dataset or nothing.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::error::LoadError;
use crate::domain::ohlcv::Record;

/// One untyped row as produced by a loader. Blank strings count as missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub date: Option<String>,
    pub open: Option<String>,
    pub high: Option<String>,
    pub low: Option<String>,
    pub close: Option<String>,
    pub volume: Option<String>,
}

/// The full dataset, immutable after [`RowStore::load`].
#[derive(Debug, Clone)]
pub struct RowStore {
    records: Vec<Record>,
}

impl RowStore {
    pub fn load<I>(rows: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = RawRow>,
    {
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, raw)| parse_row(i + 1, &raw))
            .collect::<Result<Vec<_>, _>>()?;

        if records.is_empty() {
            return Err(LoadError::Empty);
        }

        debug!(records = records.len(), "dataset loaded");
        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn require<'a>(
    value: &'a Option<String>,
    row: usize,
    field: &'static str,
) -> Result<&'a str, LoadError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(LoadError::MissingField { row, field })
}

fn invalid(row: usize, field: &'static str, value: &str) -> LoadError {
    LoadError::InvalidField {
        row,
        field,
        value: value.to_string(),
    }
}

fn parse_price(value: &Option<String>, row: usize, field: &'static str) -> Result<f64, LoadError> {
    let s = require(value, row, field)?;
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(row, field, s))
}

fn parse_row(row: usize, raw: &RawRow) -> Result<Record, LoadError> {
    let date_str = require(&raw.date, row, "date")?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| invalid(row, "date", date_str))?;

    let volume_str = require(&raw.volume, row, "volume")?;
    let volume = volume_str
        .parse::<u64>()
        .map_err(|_| invalid(row, "volume", volume_str))?;

    Ok(Record {
        date,
        open: parse_price(&raw.open, row, "open")?,
        high: parse_price(&raw.high, row, "high")?,
        low: parse_price(&raw.low, row, "low")?,
        close: parse_price(&raw.close, row, "close")?,
        volume,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, close: &str, volume: &str) -> RawRow {
        RawRow {
            date: Some(date.into()),
            open: Some("1.5".into()),
            high: Some("2.0".into()),
            low: Some("1.0".into()),
            close: Some(close.into()),
            volume: Some(volume.into()),
        }
    }

    #[test]
    fn load_parses_all_fields() {
        let store = RowStore::load(vec![raw("1970-01-02", "1.75", "1200")]).unwrap();
        assert_eq!(store.len(), 1);
        let r = &store.records()[0];
        assert_eq!(r.date, NaiveDate::from_ymd_opt(1970, 1, 2).unwrap());
        assert_eq!(r.open, 1.5);
        assert_eq!(r.high, 2.0);
        assert_eq!(r.low, 1.0);
        assert_eq!(r.close, 1.75);
        assert_eq!(r.volume, 1200);
    }

    #[test]
    fn load_preserves_input_order() {
        let store = RowStore::load(vec![
            raw("1970-01-02", "1", "1"),
            raw("1970-01-05", "2", "2"),
        ])
        .unwrap();
        let closes: Vec<f64> = store.records().iter().map(|r| r.close).collect();
        assert_eq!(closes, vec![1.0, 2.0]);
    }

    #[test]
    fn load_rejects_empty_input() {
        assert_eq!(RowStore::load(Vec::new()).unwrap_err(), LoadError::Empty);
    }

    #[test]
    fn load_rejects_missing_field() {
        let mut bad = raw("1970-01-05", "2", "2");
        bad.high = None;
        let err = RowStore::load(vec![raw("1970-01-02", "1", "1"), bad]).unwrap_err();
        assert_eq!(
            err,
            LoadError::MissingField {
                row: 2,
                field: "high"
            }
        );
    }

    #[test]
    fn blank_field_counts_as_missing() {
        let err = RowStore::load(vec![raw("1970-01-02", "  ", "1")]).unwrap_err();
        assert_eq!(
            err,
            LoadError::MissingField {
                row: 1,
                field: "close"
            }
        );
    }

    #[test]
    fn load_rejects_unparseable_values() {
        let err = RowStore::load(vec![raw("02/01/1970", "1", "1")]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidField { field: "date", .. }));

        let err = RowStore::load(vec![raw("1970-01-02", "abc", "1")]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidField { field: "close", .. }));

        let err = RowStore::load(vec![raw("1970-01-02", "1", "-3")]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidField { field: "volume", .. }));
    }

    #[test]
    fn load_rejects_non_finite_prices() {
        let err = RowStore::load(vec![raw("1970-01-02", "NaN", "1")]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidField { field: "close", .. }));

        let err = RowStore::load(vec![raw("1970-01-02", "inf", "1")]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidField { field: "close", .. }));
    }

    #[test]
    fn one_bad_row_rejects_whole_load() {
        let rows = vec![
            raw("1970-01-02", "1", "1"),
            raw("1970-01-05", "2", "2"),
            raw("1970-01-06", "x", "3"),
        ];
        assert!(RowStore::load(rows).is_err());
    }
}
