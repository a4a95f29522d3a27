#![allow(dead_code)]

use chrono::{Datelike, Duration, NaiveDate};
use stockview::adapters::png_chart::PngChartRenderer;
use stockview::domain::error::StockviewError;
use stockview::domain::row_store::{RawRow, RowStore};
use stockview::domain::settings::AnalysisSettings;
use stockview::domain::snapshot::Snapshot;
use stockview::ports::data_port::DataPort;

pub struct MockDataPort {
    pub rows: Vec<RawRow>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            rows: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_rows(&self) -> Result<Vec<RawRow>, StockviewError> {
        match &self.error {
            Some(reason) => Err(StockviewError::Data {
                reason: reason.clone(),
            }),
            None => Ok(self.rows.clone()),
        }
    }

    fn source_name(&self) -> String {
        "mock".to_string()
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn raw_row(date: &str, close: f64, volume: u64) -> RawRow {
    RawRow {
        date: Some(date.to_string()),
        open: Some(close.to_string()),
        high: Some((close * 1.01).to_string()),
        low: Some((close * 0.99).to_string()),
        close: Some(close.to_string()),
        volume: Some(volume.to_string()),
    }
}

/// One weekday row per day from `start`, with close rising by `step`.
pub fn generate_rows(start: &str, count: usize, base_price: f64, step: f64) -> Vec<RawRow> {
    let mut rows = Vec::with_capacity(count);
    let mut day = date(start);
    let mut price = base_price;
    while rows.len() < count {
        if day.weekday().number_from_monday() <= 5 {
            let volume = 1_000 + (rows.len() as u64 % 7) * 100;
            rows.push(raw_row(&day.format("%Y-%m-%d").to_string(), price, volume));
            price += step;
        }
        day += Duration::days(1);
    }
    rows
}

/// A small dataset with records in every default era.
pub fn three_era_rows() -> Vec<RawRow> {
    let mut rows = generate_rows("1985-01-01", 30, 10.0, 0.1);
    rows.extend(generate_rows("1995-06-01", 30, 20.0, 0.1));
    rows.extend(generate_rows("2005-11-01", 30, 30.0, 0.1));
    rows
}

pub fn build_snapshot(rows: Vec<RawRow>) -> Snapshot {
    let store = RowStore::load(rows).unwrap();
    Snapshot::build(store, AnalysisSettings::default(), &PngChartRenderer::default()).unwrap()
}

pub const CSV_HEADER: &str = "Date,Open,High,Low,Close,Volume,OpenInt\n";

pub fn csv_text(rows: &[RawRow]) -> String {
    let mut out = String::from(CSV_HEADER);
    for r in rows {
        let field = |v: &Option<String>| v.clone().unwrap_or_default();
        out.push_str(&format!(
            "{},{},{},{},{},{},0\n",
            field(&r.date),
            field(&r.open),
            field(&r.high),
            field(&r.low),
            field(&r.close),
            field(&r.volume)
        ));
    }
    out
}
