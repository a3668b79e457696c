//! Store error types.
//!
//! All store operations return structured errors that provide
//! user-friendly messages and optional remediation hints.

use agtrial_model::{ModelError, UploadId};
use thiserror::Error;

/// Store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite rejected a statement or the database is unavailable.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON encoding or decoding of a stored document failed.
    #[error("failed to encode stored data: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored enum value could not be parsed back.
    #[error("stored record is invalid: {0}")]
    Model(#[from] ModelError),

    /// No staged upload with this id.
    #[error("raw upload {id} not found")]
    NotFound { id: UploadId },

    /// A previous holder of the connection lock panicked.
    #[error("database connection lock poisoned")]
    Poisoned,

    /// Table name is not a registered destination.
    #[error("'{table}' is not a destination table")]
    UnknownTable { table: String },
}

impl StoreError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Sqlite(err) => format!("The database rejected the operation: {err}"),
            Self::Serialization(_) | Self::Model(_) => {
                "Stored ingestion data could not be read back; it may be corrupted.".to_string()
            }
            Self::NotFound { id } => format!("No staged upload exists with id {id}."),
            Self::Poisoned => "The database connection is unusable after an earlier failure."
                .to_string(),
            Self::UnknownTable { table } => format!("There is no destination table named '{table}'."),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Sqlite(_) => Some("Check that the database file is writable and not locked.".into()),
            Self::NotFound { .. } => Some("Check the upload id shown in the ingest summary.".into()),
            Self::Poisoned => Some("Restart the process and retry the upload.".into()),
            Self::Serialization(_) | Self::Model(_) | Self::UnknownTable { .. } => None,
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
