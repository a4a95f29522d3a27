//! Summary statistics over the full dataset.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::ohlcv::Record;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub record_count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub avg_close: f64,
    pub max_close: f64,
    pub min_close: f64,
}

/// Flat JSON shape served at `/api/summary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub total_records: usize,
    pub date_range: String,
    pub avg_close: f64,
    pub highest_close: f64,
    pub lowest_close: f64,
}

impl SummaryStats {
    /// Returns `None` for an empty input.
    pub fn compute<'a, I>(records: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut iter = records.into_iter();
        let first = iter.next()?;

        let mut stats = Self {
            record_count: 1,
            first_date: first.date,
            last_date: first.date,
            avg_close: 0.0,
            max_close: first.close,
            min_close: first.close,
        };
        let mut close_sum = first.close;

        for r in iter {
            stats.record_count += 1;
            stats.first_date = stats.first_date.min(r.date);
            stats.last_date = stats.last_date.max(r.date);
            stats.max_close = stats.max_close.max(r.close);
            stats.min_close = stats.min_close.min(r.close);
            close_sum += r.close;
        }

        stats.avg_close = close_sum / stats.record_count as f64;
        Some(stats)
    }

    pub fn view(&self) -> SummaryView {
        SummaryView {
            total_records: self.record_count,
            date_range: format!("{} to {}", self.first_date, self.last_date),
            avg_close: self.avg_close,
            highest_close: self.max_close,
            lowest_close: self.min_close,
        }
    }
}
