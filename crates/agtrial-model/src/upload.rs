use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::binding::ColumnMap;
use crate::enums::{DataType, UploadStatus};
use crate::error::ModelError;
use crate::record::{FieldValue, RawRow};

/// Identifier of a staged upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadId(i64);

impl UploadId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UploadId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(UploadId)
            .map_err(|_| ModelError::InvalidUploadId(s.to_string()))
    }
}

/// Everything needed to stage a freshly transformed file.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub trial_id: String,
    pub filename: String,
    pub data_type: DataType,
    pub raw_rows: Vec<RawRow>,
    pub headers: Vec<String>,
    pub column_map: ColumnMap,
    pub unmapped_columns: Vec<String>,
    /// Field defaults in effect at ingest, reapplied when the upload is reprocessed.
    pub defaults: BTreeMap<String, FieldValue>,
    pub content_sha256: String,
}

/// A staged upload: permanent ingestion provenance for one file attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawUpload {
    pub id: UploadId,
    pub trial_id: String,
    pub filename: String,
    pub data_type: DataType,
    /// Parsed rows, faithful to the source file.
    pub raw_rows: Vec<RawRow>,
    /// Original headers in file order.
    pub headers: Vec<String>,
    pub column_map: ColumnMap,
    pub unmapped_columns: Vec<String>,
    #[serde(default)]
    pub defaults: BTreeMap<String, FieldValue>,
    pub status: UploadStatus,
    pub error_detail: Option<String>,
    pub content_sha256: String,
    pub created_at: String,
    pub updated_at: String,
}
