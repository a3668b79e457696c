//! Structured outcomes returned to callers.

use serde::{Deserialize, Serialize};

use crate::enums::DataType;
use crate::upload::UploadId;

/// Final status of one file in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Success,
    NeedsReview,
    Error,
    /// Recognised but not lab data, such as trial photos.
    Skipped,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Success => "success",
            FileStatus::NeedsReview => "needs_review",
            FileStatus::Error => "error",
            FileStatus::Skipped => "skipped",
        }
    }
}

/// Per-file result consumed by the upload UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileResult {
    pub filename: String,
    pub file_type: Option<DataType>,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_upload_id: Option<UploadId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmapped_columns: Vec<String>,
}

impl FileResult {
    pub fn success(
        filename: impl Into<String>,
        file_type: DataType,
        record_count: usize,
        raw_upload_id: UploadId,
    ) -> Self {
        Self {
            filename: filename.into(),
            file_type: Some(file_type),
            status: FileStatus::Success,
            record_count: Some(record_count),
            detail: None,
            raw_upload_id: Some(raw_upload_id),
            unmapped_columns: Vec::new(),
        }
    }

    pub fn needs_review(
        filename: impl Into<String>,
        file_type: DataType,
        raw_upload_id: UploadId,
        unmapped_columns: Vec<String>,
    ) -> Self {
        let detail = format!(
            "{} column(s) could not be matched: {}",
            unmapped_columns.len(),
            unmapped_columns.join(", ")
        );
        Self {
            filename: filename.into(),
            file_type: Some(file_type),
            status: FileStatus::NeedsReview,
            record_count: None,
            detail: Some(detail),
            raw_upload_id: Some(raw_upload_id),
            unmapped_columns,
        }
    }

    pub fn error(
        filename: impl Into<String>,
        file_type: Option<DataType>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            file_type,
            status: FileStatus::Error,
            record_count: None,
            detail: Some(detail.into()),
            raw_upload_id: None,
            unmapped_columns: Vec::new(),
        }
    }

    pub fn skipped(filename: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            file_type: None,
            status: FileStatus::Skipped,
            record_count: None,
            detail: Some(detail.into()),
            raw_upload_id: None,
            unmapped_columns: Vec::new(),
        }
    }

    pub fn with_upload(mut self, raw_upload_id: UploadId) -> Self {
        self.raw_upload_id = Some(raw_upload_id);
        self
    }
}

/// Results for every file of one batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Trial identity in effect at the end of the batch, if any.
    pub trial_id: Option<String>,
    pub files: Vec<FileResult>,
}

impl BatchResult {
    pub fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(FileStatus::Error) > 0
    }

    pub fn total_records(&self) -> usize {
        self.files.iter().filter_map(|f| f.record_count).sum()
    }

    pub fn get(&self, filename: &str) -> Option<&FileResult> {
        self.files.iter().find(|f| f.filename == filename)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Loaded,
    Failed,
}

/// Outcome of one atomic load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOutcome {
    pub status: LoadStatus,
    pub records_written: usize,
    pub detail: Option<String>,
}

impl LoadOutcome {
    pub fn loaded(records_written: usize) -> Self {
        Self {
            status: LoadStatus::Loaded,
            records_written,
            detail: None,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            status: LoadStatus::Failed,
            records_written: 0,
            detail: Some(detail.into()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status == LoadStatus::Loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_files_are_not_errors() {
        let batch = BatchResult {
            trial_id: Some("T1".to_string()),
            files: vec![FileResult::skipped(
                "plot_12.jpg",
                "photos are not ingested as lab data",
            )],
        };
        assert!(!batch.has_errors());
        assert_eq!(batch.count(FileStatus::Skipped), 1);
        assert_eq!(FileStatus::Skipped.as_str(), "skipped");
    }
}
