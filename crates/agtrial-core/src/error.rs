//! Per-file pipeline errors.

use agtrial_ingest::IngestError;
use agtrial_map::MapError;
use agtrial_model::UploadId;
use agtrial_store::StoreError;
use agtrial_transform::TransformError;
use thiserror::Error;

/// Why one file of a batch did not load.
///
/// Errors are scoped to a single file; siblings in the batch keep going.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bytes could not be turned into rows.
    #[error(transparent)]
    Parse(#[from] IngestError),

    /// Rows could not be mapped to canonical fields.
    #[error(transparent)]
    Mapping(#[from] TransformError),

    /// The file needs a trial context the batch does not have, or names a
    /// different trial.
    #[error("{detail}")]
    Context { detail: String },

    /// The destination rejected the batch; the staged upload is marked `error`.
    #[error("{detail}")]
    Load {
        raw_upload_id: UploadId,
        detail: String,
    },

    /// Staging or review bookkeeping failed.
    #[error("{0}")]
    Staging(#[from] StoreError),

    /// The file is not something the pipeline ingests.
    #[error("{detail}")]
    Unsupported { detail: String },
}

impl From<MapError> for PipelineError {
    fn from(err: MapError) -> Self {
        Self::Mapping(TransformError::Map(err))
    }
}

impl PipelineError {
    /// Stable category name for logs and machine output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::Mapping(_) => "mapping",
            Self::Context { .. } => "context",
            Self::Load { .. } => "load",
            Self::Staging(_) => "staging",
            Self::Unsupported { .. } => "unsupported",
        }
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Parse(err) => format!("Could not read the file: {err}"),
            Self::Mapping(err) => format!("Could not map the file's columns: {err}"),
            Self::Staging(err) => err.user_message(),
            Self::Context { detail } | Self::Load { detail, .. } | Self::Unsupported { detail } => {
                detail.clone()
            }
        }
    }

    /// Staged upload the error belongs to, when it got that far.
    pub fn raw_upload_id(&self) -> Option<UploadId> {
        match self {
            Self::Load { raw_upload_id, .. } => Some(*raw_upload_id),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use agtrial_model::DataType;

    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(PipelineError::from(IngestError::EmptyContent).kind(), "parse");
        let no_rows = TransformError::NoRows {
            data_type: DataType::PlotData,
            input_rows: 0,
            reason: "the file has no data rows".to_string(),
        };
        assert_eq!(PipelineError::from(no_rows).kind(), "mapping");
        let context = PipelineError::Context {
            detail: "missing trial context".to_string(),
        };
        assert_eq!(context.kind(), "context");
        assert_eq!(context.user_message(), "missing trial context");
    }

    #[test]
    fn parse_message_names_the_problem() {
        let err = PipelineError::from(IngestError::NoDataRows);
        assert_eq!(
            err.user_message(),
            "Could not read the file: file has a header row but no data rows"
        );
    }

    #[test]
    fn load_errors_carry_the_upload() {
        let err = PipelineError::Load {
            raw_upload_id: UploadId::new(7),
            detail: "loading into plot_data failed".to_string(),
        };
        assert_eq!(err.raw_upload_id(), Some(UploadId::new(7)));
        assert_eq!(PipelineError::from(IngestError::EmptyContent).raw_upload_id(), None);
    }
}
