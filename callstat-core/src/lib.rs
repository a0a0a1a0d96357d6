//! Call-record statistics: from an Arrow table of dialer rows to a chunked,
//! minute-bucketed text report.
//!
//! Pipeline: header normalization → [`rows`] → [`filter`] (with [`time`]) →
//! [`bucket`] → [`metrics`] → [`render`] → [`chunk`]. [`ReportEngine`] wires
//! the stages together; every call is a pure function of its inputs.

pub mod bucket;
pub mod chunk;
pub mod config;
pub mod engine;
pub mod filter;
pub mod metrics;
pub mod render;
pub mod rows;
pub mod time;

use callstat_classifier::ClassifierError;
use callstat_schema::SchemaError;
use thiserror::Error;

pub use callstat_types::{BucketMetrics, CallRecord, ReportRequest, ReportType, TimeValue};
pub use chunk::split_chunks;
pub use config::ReportConfig;
pub use engine::{Aggregation, ReportEngine};
pub use render::{NO_DATA_AFTER_FILTERING, render_report};
pub use time::normalize_time;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("invalid type for column '{0}'")]
    InvalidColumnType(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
