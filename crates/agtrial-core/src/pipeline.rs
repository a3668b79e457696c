//! Batch orchestration.
//!
//! Each file runs classify → context check → parse → transform → stage →
//! load. Trial summaries are processed first because they establish the
//! trial identity every other file in the batch is attached to.
//!
//! Failures are scoped per file: a rejected file produces an `error` result
//! and the batch moves on.

use std::collections::BTreeMap;

use agtrial_ingest::{classify_filename, content_sha256, parse_content, source_format};
use agtrial_map::{config_for, infer_trial_id, resolve_headers};
use agtrial_model::{
    BatchResult, CanonicalRow, DataType, FieldValue, FileClass, FileResult, FileStatus, NewUpload,
    Overrides, PivotMode, UploadId,
};
use agtrial_store::{AtomicLoader, HistoryEntry, LoadRequest};
use agtrial_transform::{TransformInput, transform};
use tracing::info_span;

use crate::error::{PipelineError, Result};
use crate::stores::Stores;

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Caller-supplied classification; the filename classifier is used when absent.
    pub class: Option<FileClass>,
}

impl FileInput {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
            class: None,
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: FileClass) -> Self {
        self.class = Some(class);
        self
    }

    pub fn class(&self) -> FileClass {
        self.class
            .unwrap_or_else(|| classify_filename(&self.filename))
    }
}

/// Batch-wide settings.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Trial the batch belongs to. When absent, a trial summary in the batch
    /// must supply it.
    pub trial_id: Option<String>,
    /// Static values for canonical fields a file leaves empty.
    pub defaults: BTreeMap<String, FieldValue>,
}

impl PipelineOptions {
    #[must_use]
    pub fn with_trial_id(mut self, trial_id: impl Into<String>) -> Self {
        self.trial_id = Some(trial_id.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, field: impl Into<String>, value: FieldValue) -> Self {
        self.defaults.insert(field.into(), value);
        self
    }
}

/// Trial identity as it evolves through one batch.
struct TrialContext {
    current: Option<String>,
}

impl TrialContext {
    /// Adopts the trial a summary names, rejecting a conflict.
    fn establish(&mut self, inferred: Option<String>, filename: &str) -> Result<()> {
        match (inferred, self.current.as_deref()) {
            (Some(named), Some(current)) if named != current => Err(PipelineError::Context {
                detail: format!(
                    "{filename} names trial '{named}' but this batch is for trial '{current}'"
                ),
            }),
            (Some(named), _) => {
                tracing::info!(trial_id = %named, "trial context established");
                self.current = Some(named);
                Ok(())
            }
            (None, Some(_)) => Ok(()),
            (None, None) => Err(PipelineError::Context {
                detail: format!(
                    "{filename} has no trial id column and no trial id was supplied"
                ),
            }),
        }
    }

    fn require(&self, data_type: DataType) -> Result<&str> {
        self.current.as_deref().ok_or_else(|| PipelineError::Context {
            detail: format!(
                "missing trial context for {} file: include the trial summary in the batch \
                 or supply a trial id",
                data_type.label().to_lowercase()
            ),
        })
    }
}

/// Runs batches of uploaded files through parse, map, stage and load.
#[derive(Clone)]
pub struct Pipeline {
    stores: Stores,
}

impl Pipeline {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Processes every file of one batch and reports a result for each.
    ///
    /// Files are stably sorted so trial summaries run first; within each
    /// group the caller's order is kept.
    pub fn process_batch(&self, files: Vec<FileInput>, options: &PipelineOptions) -> BatchResult {
        let span = info_span!(
            "batch",
            files = files.len(),
            trial_id = options.trial_id.as_deref().unwrap_or("")
        );
        let _guard = span.enter();

        let mut classified: Vec<(FileInput, FileClass)> = files
            .into_iter()
            .map(|file| {
                let class = file.class();
                (file, class)
            })
            .collect();
        classified.sort_by_key(|(_, class)| !class.is_trial_summary());

        let mut context = TrialContext {
            current: options.trial_id.clone(),
        };
        let mut results = Vec::with_capacity(classified.len());
        for (file, class) in &classified {
            let sha256 = content_sha256(&file.bytes);
            let result = self.process_file(file, *class, &mut context, options, &sha256);
            self.stores.record_history(&HistoryEntry {
                trial_id: context.current.clone(),
                filename: result.filename.clone(),
                file_type: result.file_type,
                status: result.status,
                record_count: result.record_count,
                detail: result.detail.clone(),
                content_sha256: Some(sha256),
            });
            results.push(result);
        }

        let batch = BatchResult {
            trial_id: context.current,
            files: results,
        };
        tracing::info!(
            success = batch.count(FileStatus::Success),
            needs_review = batch.count(FileStatus::NeedsReview),
            errors = batch.count(FileStatus::Error),
            skipped = batch.count(FileStatus::Skipped),
            records = batch.total_records(),
            "batch complete"
        );
        batch
    }

    fn process_file(
        &self,
        file: &FileInput,
        class: FileClass,
        context: &mut TrialContext,
        options: &PipelineOptions,
        sha256: &str,
    ) -> FileResult {
        let span = info_span!("process_file", filename = %file.filename, ?class);
        let _guard = span.enter();

        let data_type = match class {
            FileClass::Data(data_type) => data_type,
            FileClass::Photo => {
                tracing::debug!("photo skipped");
                return FileResult::skipped(&file.filename, "photos are not ingested as lab data");
            }
            FileClass::Unknown => {
                return FileResult::error(
                    &file.filename,
                    None,
                    format!("could not determine the data type of {}", file.filename),
                );
            }
        };

        match self.ingest(file, data_type, context, options, sha256) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "file rejected");
                let result = FileResult::error(&file.filename, Some(data_type), err.user_message());
                match err.raw_upload_id() {
                    Some(id) => result.with_upload(id),
                    None => result,
                }
            }
        }
    }

    fn ingest(
        &self,
        file: &FileInput,
        data_type: DataType,
        context: &mut TrialContext,
        options: &PipelineOptions,
        sha256: &str,
    ) -> Result<FileResult> {
        let format = source_format(&file.filename).ok_or_else(|| PipelineError::Unsupported {
            detail: format!(
                "{} is neither delimited text nor a spreadsheet",
                file.filename
            ),
        })?;
        if !data_type.establishes_trial() {
            context.require(data_type)?;
        }

        let table = parse_content(&file.bytes, format)?;
        let config = config_for(data_type);
        if data_type.establishes_trial() {
            let inferred = infer_trial_id(&table.rows, &table.headers, config);
            context.establish(inferred, &file.filename)?;
        }
        let trial_id = context.require(data_type)?.to_string();

        // Files waiting for review are transformed when the reviewer submits.
        let resolution = resolve_headers(&table.headers, config, &Overrides::new())?;
        let needs_review =
            config.pivot_mode == PivotMode::Direct && !resolution.unmapped.is_empty();
        let rows = if needs_review {
            None
        } else {
            let output = transform(&TransformInput {
                rows: &table.rows,
                headers: &table.headers,
                config,
                overrides: &Overrides::new(),
                extra_defaults: &options.defaults,
            })?;
            Some(output.rows)
        };

        let id = self.stores.staging.stage(&NewUpload {
            trial_id: trial_id.clone(),
            filename: file.filename.clone(),
            data_type,
            raw_rows: table.rows,
            headers: table.headers,
            column_map: resolution.column_map,
            unmapped_columns: resolution.unmapped.clone(),
            defaults: options.defaults.clone(),
            content_sha256: sha256.to_string(),
        })?;
        tracing::debug!(raw_upload_id = %id, "staged");

        match rows {
            Some(rows) => load(&self.stores, id, data_type, &trial_id, &file.filename, rows),
            None => {
                tracing::info!(unmapped = ?resolution.unmapped, "column review required");
                Ok(FileResult::needs_review(
                    &file.filename,
                    data_type,
                    id,
                    resolution.unmapped,
                ))
            }
        }
    }
}

/// Loads transformed rows and turns the outcome into a file result.
pub(crate) fn load(
    stores: &Stores,
    id: UploadId,
    data_type: DataType,
    trial_id: &str,
    filename: &str,
    rows: Vec<CanonicalRow>,
) -> Result<FileResult> {
    let loader = AtomicLoader::new(stores.sink.as_ref(), stores.staging.as_ref());
    let outcome = loader.load(LoadRequest {
        data_type,
        trial_id,
        filename,
        rows,
        raw_upload_id: id,
    });
    if outcome.is_loaded() {
        Ok(FileResult::success(
            filename,
            data_type,
            outcome.records_written,
            id,
        ))
    } else {
        Err(PipelineError::Load {
            raw_upload_id: id,
            detail: outcome
                .detail
                .unwrap_or_else(|| "load failed".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(preset: Option<&str>) -> TrialContext {
        TrialContext {
            current: preset.map(str::to_string),
        }
    }

    #[test]
    fn summary_establishes_context() {
        let mut ctx = context(None);
        ctx.establish(Some("T24-07".to_string()), "summary.csv")
            .expect("establish");
        assert_eq!(ctx.require(DataType::SoilChemistry).ok(), Some("T24-07"));
    }

    #[test]
    fn conflicting_summary_is_rejected() {
        let mut ctx = context(Some("T1"));
        let err = ctx
            .establish(Some("T2".to_string()), "summary.csv")
            .expect_err("conflict");
        assert_eq!(err.kind(), "context");
        assert!(err.to_string().contains("'T2'"));
        assert_eq!(ctx.current.as_deref(), Some("T1"));
    }

    #[test]
    fn summary_without_id_falls_back_to_preset() {
        let mut ctx = context(Some("T1"));
        ctx.establish(None, "summary.csv").expect("fallback");
        assert_eq!(ctx.current.as_deref(), Some("T1"));

        let mut empty = context(None);
        assert!(empty.establish(None, "summary.csv").is_err());
    }

    #[test]
    fn dependent_file_needs_context() {
        let err = context(None)
            .require(DataType::PlotData)
            .expect_err("no context");
        assert!(err.to_string().contains("missing trial context"));
    }

    #[test]
    fn input_class_defaults_to_filename() {
        let file = FileInput::new("Soil Results.csv", b"x".to_vec());
        assert_eq!(file.class(), FileClass::Data(DataType::SoilChemistry));
        let tagged = file.with_class(FileClass::Data(DataType::PlotData));
        assert_eq!(tagged.class(), FileClass::Data(DataType::PlotData));
    }
}
