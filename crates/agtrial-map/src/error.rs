//! Error types for header resolution.

use agtrial_model::DataType;
use thiserror::Error;

/// Errors from applying review overrides to a header list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    /// Override refers to a header the file does not contain.
    #[error("override names column '{header}', which is not present in the file")]
    UnknownHeader { header: String },

    /// Override targets a field the data type does not define.
    #[error("cannot map column '{header}' to '{field}': {data_type} has no such field")]
    UnknownField {
        header: String,
        field: String,
        data_type: DataType,
    },
}

pub type Result<T> = std::result::Result<T, MapError>;
