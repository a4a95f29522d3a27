//! Derived series over an era subset: monthly volume and annual price averages.

use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::error::AggregationError;
use crate::domain::ohlcv::{PriceField, Record};

pub const DEFAULT_MA_WINDOW: usize = 3;

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyVolume {
    pub month: u32,
    pub label: &'static str,
    pub average_volume: f64,
    pub record_count: usize,
}

/// Always twelve entries, January first. Months without records average 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyVolumeSeries {
    pub months: Vec<MonthlyVolume>,
}

impl MonthlyVolumeSeries {
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.months.iter().map(|m| m.average_volume)
    }

    pub fn max_value(&self) -> f64 {
        self.values().fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualPrice {
    pub year: i32,
    pub mean_price: f64,
    pub moving_average: f64,
}

/// Sorted ascending by year; only years present in the input appear.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualPriceSeries {
    pub field: &'static str,
    pub window: usize,
    pub points: Vec<AnnualPrice>,
}

impl AnnualPriceSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub fn monthly_volume(records: &[&Record]) -> MonthlyVolumeSeries {
    let mut sums = [0u128; 12];
    let mut counts = [0usize; 12];

    for r in records {
        let idx = r.date.month0() as usize;
        sums[idx] += u128::from(r.volume);
        counts[idx] += 1;
    }

    let months = MONTH_LABELS
        .iter()
        .enumerate()
        .map(|(i, &label)| MonthlyVolume {
            month: i as u32 + 1,
            label,
            average_volume: if counts[i] > 0 {
                sums[i] as f64 / counts[i] as f64
            } else {
                0.0
            },
            record_count: counts[i],
        })
        .collect();

    MonthlyVolumeSeries { months }
}

/// Yearly mean of `field` with a trailing simple moving average.
///
/// The first `window - 1` years average over however many years exist so far,
/// so no leading point is dropped.
pub fn annual_price_ma(
    records: &[&Record],
    field: PriceField,
    window: usize,
) -> Result<AnnualPriceSeries, AggregationError> {
    if window == 0 {
        return Err(AggregationError::ZeroWindow);
    }

    let mut by_year: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for r in records {
        let price = r.price(field);
        if !price.is_finite() {
            return Err(AggregationError::NonFiniteValue {
                date: r.date,
                field: field.name(),
            });
        }
        let entry = by_year.entry(r.date.year()).or_insert((0.0, 0));
        entry.0 += price;
        entry.1 += 1;
    }

    let means: Vec<(i32, f64)> = by_year
        .into_iter()
        .map(|(year, (sum, n))| (year, sum / n as f64))
        .collect();

    let points = means
        .iter()
        .enumerate()
        .map(|(i, &(year, mean_price))| {
            let from = (i + 1).saturating_sub(window);
            let slice = &means[from..=i];
            let moving_average = slice.iter().map(|(_, m)| m).sum::<f64>() / slice.len() as f64;
            AnnualPrice {
                year,
                mean_price,
                moving_average,
            }
        })
        .collect();

    Ok(AnnualPriceSeries {
        field: field.name(),
        window,
        points,
    })
}
