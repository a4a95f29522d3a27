//! HTTP request handlers for web adapter.

use askama::Template;
use axum::{
    Json,
    extract::State,
    http::header,
    response::{Html, IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

use crate::domain::aggregate::{AnnualPriceSeries, MonthlyVolumeSeries};
use crate::domain::chart::ChartImage;
use crate::domain::error::RenderError;

use super::templates::{ChartSection, EraRow, IndexTemplate, LegendItem};
use super::{AppState, WebError};

pub async fn index(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    let snap = &state.snapshot;
    let summary = snap.summary.view();

    let eras: Vec<EraRow> = snap
        .eras
        .iter()
        .map(|e| EraRow {
            label: e.label.clone(),
            span: format_span(e.start, e.end),
            record_count: e.record_count,
            annual_error: e.annual.as_ref().err().map(|err| err.to_string()),
        })
        .collect();

    let charts = vec![
        chart_section(
            "Average Monthly Volume by Era",
            "/charts/monthly-volume.png",
            &snap.monthly_volume_chart,
        ),
        chart_section(
            "Annual Average Price, Moving Average by Era",
            "/charts/annual-ma.png",
            &snap.annual_ma_chart,
        ),
    ];

    let template = IndexTemplate {
        summary: &summary,
        eras: &eras,
        charts: &charts,
        records: snap.records(),
    };
    Ok(Html(template.render()?).into_response())
}

pub async fn api_data(State(state): State<Arc<AppState>>) -> Response {
    Json(state.snapshot.records()).into_response()
}

pub async fn api_summary(State(state): State<Arc<AppState>>) -> Response {
    Json(state.snapshot.summary.view()).into_response()
}

#[derive(Debug, Serialize)]
pub struct EraResponse<'a> {
    pub label: &'a str,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub record_count: usize,
    pub monthly_volume: &'a MonthlyVolumeSeries,
    pub annual: Option<&'a AnnualPriceSeries>,
    pub error: Option<String>,
}

pub async fn api_eras(State(state): State<Arc<AppState>>) -> Response {
    let eras: Vec<EraResponse> = state
        .snapshot
        .eras
        .iter()
        .map(|e| EraResponse {
            label: &e.label,
            start: e.start,
            end: e.end,
            record_count: e.record_count,
            monthly_volume: &e.monthly_volume,
            annual: e.annual.as_ref().ok(),
            error: e.annual.as_ref().err().map(|err| err.to_string()),
        })
        .collect();
    Json(eras).into_response()
}

pub async fn monthly_volume_png(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    png_response(&state.snapshot.monthly_volume_chart)
}

pub async fn annual_ma_png(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    png_response(&state.snapshot.annual_ma_chart)
}

pub async fn not_found() -> WebError {
    WebError::not_found("Page not found")
}

fn png_response(chart: &Result<ChartImage, RenderError>) -> Result<Response, WebError> {
    let image = chart.as_ref().map_err(|e| WebError::from(e.clone()))?;
    Ok(([(header::CONTENT_TYPE, "image/png")], image.png.clone()).into_response())
}

fn chart_section(
    title: &'static str,
    href: &'static str,
    chart: &Result<ChartImage, RenderError>,
) -> ChartSection {
    match chart {
        Ok(image) => ChartSection {
            title,
            href,
            data_uri: Some(image.data_uri()),
            error: None,
            legend: image
                .legend
                .iter()
                .map(|l| LegendItem {
                    label: l.label.clone(),
                    color: l.color.hex(),
                })
                .collect(),
        },
        Err(e) => ChartSection {
            title,
            href,
            data_uri: None,
            error: Some(e.to_string()),
            legend: Vec::new(),
        },
    }
}

fn format_span(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    match (start, end) {
        (Some(s), Some(e)) => format!("{s} to {e}"),
        (Some(s), None) => format!("{s} onward"),
        (None, Some(e)) => format!("up to {e}"),
        (None, None) => "all dates".to_string(),
    }
}
