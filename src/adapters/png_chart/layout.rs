//! Chart geometry in pixel space, independent of rasterisation.
//!
//! Everything a reader can check about a chart (which bar belongs to which
//! era, where a line point lands, what the axes span) is decided here.

use crate::domain::aggregate::{AnnualPriceSeries, MONTH_LABELS, MonthlyVolumeSeries};
use crate::domain::chart::MAX_CHART_DIMENSION;
use crate::domain::error::RenderError;

pub const MARGIN_LEFT: f64 = 100.0;
pub const MARGIN_RIGHT: f64 = 30.0;
pub const MARGIN_TOP: f64 = 70.0;
pub const MARGIN_BOTTOM: f64 = 70.0;

pub const MIN_WIDTH: u32 = 300;
pub const MIN_HEIGHT: u32 = 200;
pub const MAX_WIDTH: u32 = MAX_CHART_DIMENSION;
pub const MAX_HEIGHT: u32 = MAX_CHART_DIMENSION;

/// Share of each month slot taken by its bar cluster.
const CLUSTER_FILL: f64 = 0.8;
const TARGET_TICKS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PlotArea {
    pub fn for_size(width: u32, height: u32) -> Result<Self, RenderError> {
        let width_ok = (MIN_WIDTH..=MAX_WIDTH).contains(&width);
        let height_ok = (MIN_HEIGHT..=MAX_HEIGHT).contains(&height);
        if !width_ok || !height_ok {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        Ok(Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            right: width as f64 - MARGIN_RIGHT,
            bottom: height as f64 - MARGIN_BOTTOM,
        })
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Maps a data interval linearly onto a pixel interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarRect {
    pub series: usize,
    pub month: usize,
    pub value: f64,
    pub x: f64,
    pub width: f64,
    pub top: f64,
    pub bottom: f64,
}

impl BarRect {
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub label: &'static str,
    pub center_x: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub plot: PlotArea,
    pub y_scale: LinearScale,
    pub y_ticks: Vec<f64>,
    pub clusters: Vec<Cluster>,
    pub bars: Vec<BarRect>,
}

pub fn bar_layout(
    series: &[MonthlyVolumeSeries],
    width: u32,
    height: u32,
) -> Result<BarLayout, RenderError> {
    if series.is_empty() {
        return Err(RenderError::EmptySeriesList);
    }
    for (i, s) in series.iter().enumerate() {
        if s.values().any(|v| !v.is_finite() || v < 0.0) {
            return Err(RenderError::NonFiniteValue { series: i });
        }
    }

    let plot = PlotArea::for_size(width, height)?;
    let max = series.iter().map(|s| s.max_value()).fold(0.0, f64::max);
    let (_, y_max, step) = nice_range(0.0, max);
    let y_scale = LinearScale {
        domain: (0.0, y_max),
        range: (plot.bottom, plot.top),
    };

    let slot = plot.width() / MONTH_LABELS.len() as f64;
    let bar_width = slot * CLUSTER_FILL / series.len() as f64;
    let pad = slot * (1.0 - CLUSTER_FILL) / 2.0;

    let clusters = MONTH_LABELS
        .iter()
        .enumerate()
        .map(|(m, &label)| Cluster {
            label,
            center_x: plot.left + slot * (m as f64 + 0.5),
        })
        .collect();

    let mut bars = Vec::with_capacity(series.len() * MONTH_LABELS.len());
    for m in 0..MONTH_LABELS.len() {
        let slot_left = plot.left + slot * m as f64;
        for (i, s) in series.iter().enumerate() {
            let value = s.months.get(m).map_or(0.0, |mv| mv.average_volume);
            bars.push(BarRect {
                series: i,
                month: m,
                value,
                x: slot_left + pad + bar_width * i as f64,
                width: bar_width,
                top: y_scale.map(value),
                bottom: plot.bottom,
            });
        }
    }

    Ok(BarLayout {
        plot,
        y_scale,
        y_ticks: ticks(0.0, y_max, step),
        clusters,
        bars,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePoint {
    pub year: i32,
    pub value: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePath {
    pub series: usize,
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    pub plot: PlotArea,
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
    pub x_ticks: Vec<i32>,
    pub y_ticks: Vec<f64>,
    pub lines: Vec<LinePath>,
}

pub fn line_layout(
    series: &[AnnualPriceSeries],
    width: u32,
    height: u32,
) -> Result<LineLayout, RenderError> {
    if series.is_empty() {
        return Err(RenderError::EmptySeriesList);
    }
    for (i, s) in series.iter().enumerate() {
        if s.points.iter().any(|p| !p.moving_average.is_finite()) {
            return Err(RenderError::NonFiniteValue { series: i });
        }
    }

    let all = || series.iter().flat_map(|s| s.points.iter());
    let years = || all().map(|p| p.year);
    let (Some(min_year), Some(max_year)) = (years().min(), years().max()) else {
        return Err(RenderError::NoData);
    };
    let min_value = all().map(|p| p.moving_average).fold(f64::INFINITY, f64::min);
    let max_value = all().map(|p| p.moving_average).fold(f64::NEG_INFINITY, f64::max);

    let plot = PlotArea::for_size(width, height)?;
    let x_scale = LinearScale {
        domain: (min_year as f64 - 0.5, max_year as f64 + 0.5),
        range: (plot.left, plot.right),
    };
    let (y_min, y_max, y_step) = nice_range(min_value, max_value);
    let y_scale = LinearScale {
        domain: (y_min, y_max),
        range: (plot.bottom, plot.top),
    };

    let lines = series
        .iter()
        .enumerate()
        .map(|(i, s)| LinePath {
            series: i,
            points: s
                .points
                .iter()
                .map(|p| LinePoint {
                    year: p.year,
                    value: p.moving_average,
                    x: x_scale.map(p.year as f64),
                    y: y_scale.map(p.moving_average),
                })
                .collect(),
        })
        .collect();

    Ok(LineLayout {
        plot,
        x_scale,
        y_scale,
        x_ticks: year_ticks(min_year, max_year),
        y_ticks: ticks(y_min, y_max, y_step),
        lines,
    })
}

/// Step of the form 1, 2 or 5 times a power of ten, at least `raw`.
fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Rounded `(lo, hi, step)` with `lo <= min`, `hi >= max` and `lo < hi`.
fn nice_range(min: f64, max: f64) -> (f64, f64, f64) {
    let span = max - min;
    let step = if span > 0.0 {
        nice_step(span / TARGET_TICKS)
    } else {
        nice_step(max.abs() / TARGET_TICKS)
    };
    let lo = (min / step).floor() * step;
    let mut hi = (max / step).ceil() * step;
    if hi <= lo {
        hi = lo + step;
    }
    (lo, hi, step)
}

fn ticks(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    let n = ((hi - lo) / step).round() as usize;
    (0..=n).map(|i| lo + step * i as f64).collect()
}

fn year_ticks(min_year: i32, max_year: i32) -> Vec<i32> {
    let span = (max_year - min_year).max(1) as f64;
    let step = (nice_step(span / 8.0).round() as i32).max(1);
    let first = min_year.div_euclid(step) * step;
    (first..=max_year)
        .step_by(step as usize)
        .filter(|y| *y >= min_year)
        .collect()
}

/// Short axis label: 1.5M, 250K, 12.5.
pub fn format_tick(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e4 {
        (value / 1e3, "K")
    } else {
        (value, "")
    };
    let text = format!("{scaled:.1}");
    let text = text.strip_suffix(".0").unwrap_or(&text);
    format!("{text}{suffix}")
}
