//! Core domain types and logic.

pub mod aggregate;
pub mod chart;
pub mod era;
pub mod error;
pub mod ohlcv;
pub mod row_store;
pub mod settings;
pub mod snapshot;
pub mod summary;
