//! Domain error types.

use chrono::NaiveDate;

/// Rejection of the raw row sequence handed to the row store.
///
/// Row numbers are 1-based and count data rows only (the header is not a row).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("dataset is empty")]
    Empty,

    #[error("row {row}: missing field {field}")]
    MissingField { row: usize, field: &'static str },

    #[error("row {row}: invalid {field} value {value:?}")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregationError {
    #[error("moving average window must be at least 1")]
    ZeroWindow,

    #[error("non-finite {field} value on {date}")]
    NonFiniteValue { date: NaiveDate, field: &'static str },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("no series to render")]
    EmptySeriesList,

    #[error("{series} series but {labels} labels")]
    LabelCountMismatch { series: usize, labels: usize },

    #[error("every series is empty")]
    NoData,

    #[error("series {series} contains a non-finite value")]
    NonFiniteValue { series: usize },

    #[error("invalid chart dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("png encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error in {file}: {reason}")]
    Parse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    Missing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    Invalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("era {label} starts after it ends")]
    InvertedEra { label: String },

    #[error("duplicate era label {0}")]
    DuplicateEraLabel(String),

    #[error("eras {first} and {second} overlap")]
    OverlappingEras { first: String, second: String },
}

/// Top-level error type for stockview.
#[derive(Debug, thiserror::Error)]
pub enum StockviewError {
    #[error("data source error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StockviewError> for std::process::ExitCode {
    fn from(err: &StockviewError) -> Self {
        let code: u8 = match err {
            StockviewError::Io(_) => 1,
            StockviewError::Config(_) => 2,
            StockviewError::Data { .. } | StockviewError::Load(_) => 3,
            StockviewError::Render(_) => 4,
        };
        std::process::ExitCode::from(code)
    }
}
