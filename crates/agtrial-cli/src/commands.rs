use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use agtrial_core::{FileInput, Pipeline, PipelineOptions, ReviewPayload, ReviewResolver, Stores};
use agtrial_map::all_configs;
use agtrial_model::{BatchResult, Binding, FieldValue, FileResult, Overrides, UploadId};
use agtrial_store::{CoverageEntry, RecordSink, SqliteStore};

/// Files and settings for one `ingest` run.
#[derive(Debug, Clone, Default)]
pub struct IngestRequest {
    pub files: Vec<PathBuf>,
    pub trial_id: Option<String>,
    pub defaults: BTreeMap<String, FieldValue>,
}

/// Coverage flags plus per-type record counts for one trial.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub trial_id: String,
    pub entries: Vec<CoverageEntry>,
    /// `(file type, records)` for every registered data type.
    pub counts: Vec<(String, usize)>,
}

pub fn open_store(path: &Path) -> Result<Arc<SqliteStore>> {
    let store = SqliteStore::open(path)
        .with_context(|| format!("open database {}", path.display()))?;
    Ok(Arc::new(store))
}

pub fn run_ingest(store: Arc<SqliteStore>, request: IngestRequest) -> Result<BatchResult> {
    let mut files = Vec::with_capacity(request.files.len());
    for path in &request.files {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let filename = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        files.push(FileInput::new(filename, bytes));
    }
    info!(files = files.len(), "starting ingest");

    let options = PipelineOptions {
        trial_id: request.trial_id,
        defaults: request.defaults,
    };
    Ok(Pipeline::new(Stores::shared(store)).process_batch(files, &options))
}

pub fn run_review_show(store: Arc<SqliteStore>, upload_id: i64) -> Result<ReviewPayload> {
    let id = UploadId::new(upload_id);
    ReviewResolver::new(Stores::shared(store))
        .fetch(id)
        .with_context(|| format!("load upload {id} for review"))
}

pub fn run_review_submit(
    store: Arc<SqliteStore>,
    upload_id: i64,
    mappings: &[(String, String)],
    defaults: BTreeMap<String, FieldValue>,
) -> Result<FileResult> {
    let id = UploadId::new(upload_id);
    let overrides = build_overrides(mappings)?;
    ReviewResolver::new(Stores::shared(store))
        .with_defaults(defaults)
        .reprocess(id, &overrides)
        .with_context(|| format!("reprocess upload {id}"))
}

/// Turns `HEADER=FIELD` pairs into overrides; later pairs win.
pub fn build_overrides(mappings: &[(String, String)]) -> Result<Overrides> {
    let mut overrides = Overrides::new();
    for (header, raw) in mappings {
        let binding = Binding::parse(header, raw)?;
        overrides.insert(header.clone(), binding);
    }
    Ok(overrides)
}

pub fn run_coverage(store: &SqliteStore, trial_id: &str) -> Result<CoverageReport> {
    let entries = store
        .coverage(trial_id)
        .with_context(|| format!("read coverage for {trial_id}"))?;
    let mut counts = Vec::new();
    for config in all_configs() {
        let records = store
            .count_records(config.target_table, trial_id)
            .with_context(|| format!("count {} records", config.target_table))?;
        counts.push((config.file_type_tag.to_string(), records));
    }
    Ok(CoverageReport {
        trial_id: trial_id.to_string(),
        entries,
        counts,
    })
}
