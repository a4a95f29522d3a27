//! HTML templates using Askama.

use askama::Template;

use crate::domain::ohlcv::Record;
use crate::domain::summary::SummaryView;

pub struct EraRow {
    pub label: String,
    pub span: String,
    pub record_count: usize,
    pub annual_error: Option<String>,
}

pub struct LegendItem {
    pub label: String,
    pub color: String,
}

/// One chart block on the index page. A failed chart carries `error`
/// instead of `data_uri`.
pub struct ChartSection {
    pub title: &'static str,
    pub href: &'static str,
    pub data_uri: Option<String>,
    pub error: Option<String>,
    pub legend: Vec<LegendItem>,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub summary: &'a SummaryView,
    pub eras: &'a [EraRow],
    pub charts: &'a [ChartSection],
    pub records: &'a [Record],
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub message: &'a str,
    pub status: u16,
}
