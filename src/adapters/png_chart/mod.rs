//! PNG chart renderer implementing [`ChartRenderer`].
//!
//! Geometry comes from [`layout`]; this module only paints it.

pub mod canvas;
pub mod font;
pub mod layout;

use crate::domain::aggregate::{AnnualPriceSeries, MonthlyVolumeSeries};
use crate::domain::chart::{ChartImage, ChartSettings, LegendEntry, Rgb};
use crate::domain::error::RenderError;
use crate::ports::chart_port::ChartRenderer;

use canvas::Canvas;
use layout::{BarLayout, LineLayout, PlotArea, bar_layout, format_tick, line_layout};

const BACKGROUND: Rgb = Rgb(255, 255, 255);
const AXIS: Rgb = Rgb(40, 40, 40);
const GRID: Rgb = Rgb(225, 225, 225);
const TEXT: Rgb = Rgb(30, 30, 30);

/// Series colours, cycled when there are more series than entries.
pub const PALETTE: [Rgb; 6] = [
    Rgb(31, 119, 180),
    Rgb(255, 127, 14),
    Rgb(44, 160, 44),
    Rgb(214, 39, 40),
    Rgb(148, 103, 189),
    Rgb(140, 86, 75),
];

const TITLE_SCALE: u32 = 3;
const LABEL_SCALE: u32 = 2;
const LINE_THICKNESS: u32 = 3;
const MARKER_RADIUS: f64 = 4.5;
const SWATCH: f64 = 14.0;

pub fn series_color(index: usize) -> Rgb {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, Default)]
pub struct PngChartRenderer {
    settings: ChartSettings,
}

impl PngChartRenderer {
    pub fn new(settings: ChartSettings) -> Self {
        Self { settings }
    }

    fn legend(labels: &[String]) -> Vec<LegendEntry> {
        labels
            .iter()
            .enumerate()
            .map(|(i, label)| LegendEntry {
                label: label.clone(),
                color: series_color(i),
            })
            .collect()
    }

    fn finish(&self, canvas: &Canvas, legend: Vec<LegendEntry>) -> Result<ChartImage, RenderError> {
        let png = canvas.encode_png(self.settings.dpi)?;
        Ok(ChartImage::from_png(
            png,
            canvas.width(),
            canvas.height(),
            self.settings.dpi,
            legend,
        ))
    }

    fn paint_monthly_volume(
        &self,
        layout: &BarLayout,
        labels: &[String],
    ) -> Result<Canvas, RenderError> {
        let mut canvas = Canvas::new(self.settings.width, self.settings.height, BACKGROUND)?;
        let plot = layout.plot;

        for &tick in &layout.y_ticks {
            let y = layout.y_scale.map(tick);
            canvas.hline(plot.left, plot.right, y, GRID);
            canvas.text_right(plot.left - 10.0, y, &format_tick(tick), LABEL_SCALE, TEXT);
        }

        for bar in &layout.bars {
            let color = series_color(bar.series);
            canvas.fill_rect(bar.x, bar.top, bar.x + bar.width, bar.bottom, color);
        }

        for cluster in &layout.clusters {
            let y = plot.bottom + 12.0;
            canvas.text_centered(cluster.center_x, y, cluster.label, LABEL_SCALE, TEXT);
        }

        draw_axes(&mut canvas, &plot);
        draw_header(&mut canvas, "Average Monthly Volume by Era", "Avg volume", labels);
        draw_x_title(&mut canvas, &plot, "Month");
        Ok(canvas)
    }

    fn paint_annual_ma(
        &self,
        layout: &LineLayout,
        title: &str,
        labels: &[String],
    ) -> Result<Canvas, RenderError> {
        let mut canvas = Canvas::new(self.settings.width, self.settings.height, BACKGROUND)?;
        let plot = layout.plot;

        for &tick in &layout.y_ticks {
            let y = layout.y_scale.map(tick);
            canvas.hline(plot.left, plot.right, y, GRID);
            canvas.text_right(plot.left - 10.0, y, &format_tick(tick), LABEL_SCALE, TEXT);
        }
        for &year in &layout.x_ticks {
            let x = layout.x_scale.map(year as f64);
            canvas.vline(x, plot.top, plot.bottom, GRID);
            canvas.text_centered(x, plot.bottom + 12.0, &year.to_string(), LABEL_SCALE, TEXT);
        }

        for line in &layout.lines {
            let color = series_color(line.series);
            for pair in line.points.windows(2) {
                canvas.line((pair[0].x, pair[0].y), (pair[1].x, pair[1].y), LINE_THICKNESS, color);
            }
            for p in &line.points {
                canvas.fill_circle(p.x, p.y, MARKER_RADIUS, color);
            }
        }

        draw_axes(&mut canvas, &plot);
        draw_header(&mut canvas, title, "Price", labels);
        draw_x_title(&mut canvas, &plot, "Year");
        Ok(canvas)
    }
}

fn check_labels(series: usize, labels: usize) -> Result<(), RenderError> {
    if series == 0 {
        return Err(RenderError::EmptySeriesList);
    }
    if series != labels {
        return Err(RenderError::LabelCountMismatch { series, labels });
    }
    Ok(())
}

fn draw_axes(canvas: &mut Canvas, plot: &PlotArea) {
    canvas.vline(plot.left, plot.top, plot.bottom + 1.0, AXIS);
    canvas.hline(plot.left, plot.right, plot.bottom, AXIS);
}

fn draw_x_title(canvas: &mut Canvas, plot: &PlotArea, title: &str) {
    let cx = (plot.left + plot.right) / 2.0;
    canvas.text_centered(cx, plot.bottom + 42.0, title, LABEL_SCALE, TEXT);
}

fn draw_header(canvas: &mut Canvas, title: &str, y_title: &str, labels: &[String]) {
    let width = canvas.width() as f64;
    canvas.text_centered(width / 2.0, 12.0, title, TITLE_SCALE, TEXT);
    canvas.text(12.0, layout::MARGIN_TOP - 24.0, y_title, LABEL_SCALE, TEXT);

    // Legend runs right to left so it always ends at the plot's right edge.
    let mut right = width - layout::MARGIN_RIGHT;
    let y = layout::MARGIN_TOP - 26.0;
    for (i, label) in labels.iter().enumerate().rev() {
        let text_w = font::text_width(label, LABEL_SCALE) as f64;
        let text_x = right - text_w;
        canvas.text(text_x, y, label, LABEL_SCALE, TEXT);
        let swatch_x = text_x - 6.0 - SWATCH;
        canvas.fill_rect(swatch_x, y, swatch_x + SWATCH, y + SWATCH, series_color(i));
        right = swatch_x - 18.0;
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render_monthly_volume(
        &self,
        series: &[MonthlyVolumeSeries],
        labels: &[String],
    ) -> Result<ChartImage, RenderError> {
        check_labels(series.len(), labels.len())?;
        let layout = bar_layout(series, self.settings.width, self.settings.height)?;
        let canvas = self.paint_monthly_volume(&layout, labels)?;
        self.finish(&canvas, Self::legend(labels))
    }

    fn render_annual_ma(
        &self,
        series: &[AnnualPriceSeries],
        labels: &[String],
    ) -> Result<ChartImage, RenderError> {
        check_labels(series.len(), labels.len())?;
        let layout = line_layout(series, self.settings.width, self.settings.height)?;
        let first = &series[0];
        let title = format!(
            "Annual Mean {} ({}-Year Moving Average)",
            first.field, first.window
        );
        let canvas = self.paint_annual_ma(&layout, &title, labels)?;
        self.finish(&canvas, Self::legend(labels))
    }
}
