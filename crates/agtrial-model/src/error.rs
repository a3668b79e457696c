use thiserror::Error;

/// Errors raised while parsing model values from text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown data type '{0}'")]
    UnknownDataType(String),
    #[error("unknown upload status '{0}'")]
    UnknownStatus(String),
    #[error("invalid upload id '{0}'")]
    InvalidUploadId(String),
    #[error("column binding for '{header}' is empty")]
    EmptyBinding { header: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
