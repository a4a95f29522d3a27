//! Web server adapter.
//!
//! Serves the startup [`Snapshot`] read-only: an HTML page with the data
//! table and both charts, JSON endpoints, and the raw chart images.

mod error;
mod handlers;
mod templates;

pub use error::WebError;
pub use handlers::*;
pub use templates::*;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::domain::snapshot::Snapshot;

pub struct AppState {
    pub snapshot: Arc<Snapshot>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/data", get(handlers::api_data))
        .route("/api/summary", get(handlers::api_summary))
        .route("/api/eras", get(handlers::api_eras))
        .route("/charts/monthly-volume.png", get(handlers::monthly_volume_png))
        .route("/charts/annual-ma.png", get(handlers::annual_ma_png))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
