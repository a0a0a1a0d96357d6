#![forbid(unsafe_code)]

pub mod headers;
pub mod macros;

use arrow::error::ArrowError;
use thiserror::Error;

pub use headers::{
    default_aliases, is_unnamed, looks_headerless, rename_columns, synthesized_names,
    HeaderNormalizer,
};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("table has {0} columns, at least 3 are required")]
    TooFewColumns(usize),
    #[error(transparent)]
    Arrow(#[from] ArrowError),
}

/// Table definitions for the dialer export.
pub mod generated {
    use crate::define_tables;

    define_tables! {
        /// One row per dialled call: when it happened, how it ended, who placed it.
        table CallRecords {
            columns: {
                time: Utf8 => "Time",
                result: Utf8 => "Result",
                employee: Utf8 => "Employee"
            }
        }
    }
}

pub use generated::*;
