//! Everything the presentation layer serves, computed once at startup.
//!
//! Each era's aggregates and each chart are kept as separate results, so one
//! failure leaves the rest of the snapshot usable.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::aggregate::{
    AnnualPriceSeries, MonthlyVolumeSeries, annual_price_ma, monthly_volume,
};
use crate::domain::chart::ChartImage;
use crate::domain::era::partition;
use crate::domain::error::{AggregationError, LoadError, RenderError};
use crate::domain::ohlcv::Record;
use crate::domain::row_store::RowStore;
use crate::domain::settings::AnalysisSettings;
use crate::domain::summary::SummaryStats;
use crate::ports::chart_port::ChartRenderer;

#[derive(Debug, Clone)]
pub struct EraAggregates {
    pub label: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub record_count: usize,
    pub monthly_volume: MonthlyVolumeSeries,
    pub annual: Result<AnnualPriceSeries, AggregationError>,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    store: RowStore,
    pub settings: AnalysisSettings,
    pub summary: SummaryStats,
    pub eras: Vec<EraAggregates>,
    pub monthly_volume_chart: Result<ChartImage, RenderError>,
    pub annual_ma_chart: Result<ChartImage, RenderError>,
}

impl Snapshot {
    pub fn build(
        store: RowStore,
        settings: AnalysisSettings,
        renderer: &dyn ChartRenderer,
    ) -> Result<Self, LoadError> {
        let summary = SummaryStats::compute(store.records()).ok_or(LoadError::Empty)?;
        let eras = aggregate_eras(store.records(), &settings);

        let labels: Vec<String> = eras.iter().map(|e| e.label.clone()).collect();
        let volume_series: Vec<MonthlyVolumeSeries> =
            eras.iter().map(|e| e.monthly_volume.clone()).collect();
        let monthly_volume_chart = renderer.render_monthly_volume(&volume_series, &labels);
        if let Err(e) = &monthly_volume_chart {
            warn!(error = %e, "monthly volume chart failed");
        }

        let ma_series = line_series(&eras, &settings);
        let annual_ma_chart = renderer.render_annual_ma(&ma_series, &labels);
        if let Err(e) = &annual_ma_chart {
            warn!(error = %e, "annual moving average chart failed");
        }

        Ok(Self {
            store,
            settings,
            summary,
            eras,
            monthly_volume_chart,
            annual_ma_chart,
        })
    }

    pub fn records(&self) -> &[Record] {
        self.store.records()
    }
}

/// One series per era in era order, so each era keeps the same colour in both
/// charts. An era whose aggregation failed contributes an empty series.
fn line_series(eras: &[EraAggregates], settings: &AnalysisSettings) -> Vec<AnnualPriceSeries> {
    eras.iter()
        .map(|e| match &e.annual {
            Ok(series) => series.clone(),
            Err(_) => AnnualPriceSeries {
                field: settings.price_field.name(),
                window: settings.ma_window,
                points: Vec::new(),
            },
        })
        .collect()
}

fn aggregate_eras(records: &[Record], settings: &AnalysisSettings) -> Vec<EraAggregates> {
    let parts = partition(records, &settings.eras);
    parts
        .iter()
        .map(|subset| {
            let annual = annual_price_ma(&subset.records, settings.price_field, settings.ma_window);
            match &annual {
                Ok(series) => info!(
                    era = %subset.era.label,
                    records = subset.len(),
                    years = series.points.len(),
                    "era aggregated"
                ),
                Err(e) => warn!(era = %subset.era.label, error = %e, "annual aggregation failed"),
            }
            EraAggregates {
                label: subset.era.label.clone(),
                start: subset.era.start,
                end: subset.era.end,
                record_count: subset.len(),
                monthly_volume: monthly_volume(&subset.records),
                annual,
            }
        })
        .collect()
}
