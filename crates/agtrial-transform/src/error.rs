//! Transform error types.

use agtrial_map::MapError;
use agtrial_model::DataType;
use thiserror::Error;

/// Errors that stop a file from producing canonical rows.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Overrides could not be applied to the file's headers.
    #[error(transparent)]
    Map(#[from] MapError),

    /// Input existed (or not) but nothing survived the transform.
    #[error("no {data_type} rows could be produced from {input_rows} input row(s): {reason}")]
    NoRows {
        data_type: DataType,
        input_rows: usize,
        reason: String,
    },

    /// The registry's unit pattern does not compile.
    #[error("invalid unit pattern for {data_type}: {source}")]
    UnitPattern {
        data_type: DataType,
        #[source]
        source: regex::Error,
    },
}

pub type Result<T> = std::result::Result<T, TransformError>;
