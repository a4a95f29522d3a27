//! Chart rendering port trait.

use crate::domain::aggregate::{AnnualPriceSeries, MonthlyVolumeSeries};
use crate::domain::chart::ChartImage;
use crate::domain::error::RenderError;

/// Turns aggregated era series into encoded images.
///
/// `labels[i]` names `series[i]`; implementations reject mismatched lengths.
pub trait ChartRenderer {
    /// Grouped bars: one cluster per month, one bar per series.
    fn render_monthly_volume(
        &self,
        series: &[MonthlyVolumeSeries],
        labels: &[String],
    ) -> Result<ChartImage, RenderError>;

    /// One line per series through `(year, moving_average)`.
    fn render_annual_ma(
        &self,
        series: &[AnnualPriceSeries],
        labels: &[String],
    ) -> Result<ChartImage, RenderError>;
}
