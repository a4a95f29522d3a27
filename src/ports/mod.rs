//! Port traits at the seams between the domain and its adapters.

pub mod chart_port;
pub mod config_port;
pub mod data_port;
