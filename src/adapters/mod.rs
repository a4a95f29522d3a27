//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod png_chart;
#[cfg(feature = "web")]
pub mod web;
