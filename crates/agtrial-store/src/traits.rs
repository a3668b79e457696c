//! Storage seams used by the pipeline.
//!
//! Every trait is `Send + Sync` so independent batches can share one store.

use agtrial_model::{
    CanonicalRow, ColumnMap, ColumnMapConfig, DataType, FileStatus, NewUpload, RawUpload, UploadId,
};
use serde::Serialize;

use crate::error::Result;

/// Persists parsed files for asynchronous review.
pub trait StagingStore: Send + Sync {
    /// Stages a new upload; status is derived from pivot mode and unmapped columns.
    fn stage(&self, upload: &NewUpload) -> Result<UploadId>;

    fn fetch(&self, id: UploadId) -> Result<RawUpload>;

    /// Merges `column_map` into the stored map, clears unmapped columns and
    /// marks the upload `mapped`.
    fn apply_overrides(&self, id: UploadId, column_map: &ColumnMap) -> Result<()>;

    fn mark_error(&self, id: UploadId, detail: &str) -> Result<()>;
}

/// A canonical row with its precomputed natural key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedRow {
    pub natural_key: String,
    pub row: CanonicalRow,
}

/// One deduplicated batch bound for a destination table.
#[derive(Debug, Clone, Copy)]
pub struct LoadBatch<'a> {
    pub config: &'a ColumnMapConfig,
    pub trial_id: &'a str,
    pub raw_upload_id: UploadId,
    /// No two entries share a natural key.
    pub rows: &'a [KeyedRow],
}

/// Coverage flag for one trial and file type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageEntry {
    pub file_type: String,
    pub has_data: bool,
    pub updated_at: String,
}

/// Destination store for loaded records.
pub trait RecordSink: Send + Sync {
    /// Upserts every row and sets coverage in one transaction.
    ///
    /// Returns the number of rows written. Nothing is applied on error.
    fn apply_load(&self, batch: &LoadBatch<'_>) -> Result<usize>;

    fn count_records(&self, table: &str, trial_id: &str) -> Result<usize>;

    fn coverage(&self, trial_id: &str) -> Result<Vec<CoverageEntry>>;
}

/// One upload-history audit entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub trial_id: Option<String>,
    pub filename: String,
    pub file_type: Option<DataType>,
    pub status: FileStatus,
    pub record_count: Option<usize>,
    pub detail: Option<String>,
    pub content_sha256: Option<String>,
}

/// Best-effort audit log. Callers ignore failures after logging them.
pub trait UploadLog: Send + Sync {
    fn record(&self, entry: &HistoryEntry) -> Result<()>;
}
