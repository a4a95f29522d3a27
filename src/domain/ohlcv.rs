//! One trading day's price/volume observation.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A daily OHLCV record.
///
/// Serialises with the column names of the source file so `/api/data`
/// keeps the shape clients already read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Record {
    pub fn price(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
        }
    }
}

/// Which price column an aggregate reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceField {
    Open,
    High,
    Low,
    #[default]
    Close,
}

impl PriceField {
    pub fn name(self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PriceField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(PriceField::Open),
            "high" => Ok(PriceField::High),
            "low" => Ok(PriceField::Low),
            "close" => Ok(PriceField::Close),
            other => Err(format!("unknown price field: {other}")),
        }
    }
}
