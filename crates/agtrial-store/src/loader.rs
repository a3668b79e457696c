//! Atomic, deduplicating loader.

use std::collections::BTreeMap;

use agtrial_map::config_for;
use agtrial_model::{CanonicalRow, ColumnMapConfig, DataType, FieldValue, LoadOutcome, UploadId};
use sha2::{Digest, Sha256};

use crate::traits::{KeyedRow, LoadBatch, RecordSink, StagingStore};

/// Natural key text for a row.
///
/// The key is the JSON array of the key field values, with a blank optional
/// field keyed as empty text. When a required key field is blank the row can
/// only match an exact duplicate, so the key is a hash of every field.
pub fn natural_key(row: &CanonicalRow, config: &ColumnMapConfig) -> String {
    let parts: Option<Vec<String>> = config
        .natural_key_fields
        .iter()
        .map(|field| match row.get(field).and_then(FieldValue::key_text) {
            Some(text) => Some(text),
            None if config.is_optional_key(field) => Some(String::new()),
            None => None,
        })
        .collect();

    match parts {
        Some(parts) => serde_json::Value::from(parts).to_string(),
        None => {
            let encoded = serde_json::to_vec(&row.fields).unwrap_or_default();
            format!("row:{}", hex::encode(Sha256::digest(&encoded)))
        }
    }
}

/// Collapses rows sharing a natural key: the last row wins, placed where
/// the key first appeared.
pub fn collapse_duplicates(rows: Vec<CanonicalRow>, config: &ColumnMapConfig) -> Vec<KeyedRow> {
    let mut positions: BTreeMap<String, usize> = BTreeMap::new();
    let mut keyed: Vec<KeyedRow> = Vec::with_capacity(rows.len());
    for row in rows {
        let natural_key = natural_key(&row, config);
        match positions.get(&natural_key) {
            Some(&index) => keyed[index].row = row,
            None => {
                positions.insert(natural_key.clone(), keyed.len());
                keyed.push(KeyedRow { natural_key, row });
            }
        }
    }
    keyed
}

/// What to load and where it came from.
#[derive(Debug, Clone)]
pub struct LoadRequest<'a> {
    pub data_type: DataType,
    pub trial_id: &'a str,
    pub filename: &'a str,
    pub rows: Vec<CanonicalRow>,
    pub raw_upload_id: UploadId,
}

/// Loads canonical rows and flags coverage, marking the staged upload
/// `error` when the destination rejects the batch.
pub struct AtomicLoader<'a> {
    sink: &'a dyn RecordSink,
    staging: &'a dyn StagingStore,
}

impl<'a> AtomicLoader<'a> {
    pub fn new(sink: &'a dyn RecordSink, staging: &'a dyn StagingStore) -> Self {
        Self { sink, staging }
    }

    pub fn load(&self, request: LoadRequest<'_>) -> LoadOutcome {
        let config = config_for(request.data_type);
        let span = tracing::info_span!(
            "load",
            table = config.target_table,
            trial_id = request.trial_id,
            filename = request.filename,
            raw_upload_id = %request.raw_upload_id,
        );
        let _guard = span.enter();

        let input_rows = request.rows.len();
        let rows = collapse_duplicates(request.rows, config);
        if rows.len() < input_rows {
            tracing::debug!(
                input_rows,
                unique_rows = rows.len(),
                "collapsed duplicate natural keys"
            );
        }

        let batch = LoadBatch {
            config,
            trial_id: request.trial_id,
            raw_upload_id: request.raw_upload_id,
            rows: &rows,
        };
        match self.sink.apply_load(&batch) {
            Ok(written) => {
                tracing::info!(records_written = written, "load committed");
                LoadOutcome::loaded(written)
            }
            Err(err) => {
                let detail = format!("loading into {} failed: {err}", config.target_table);
                tracing::error!(error = %err, "load rolled back");
                if let Err(mark_err) = self.staging.mark_error(request.raw_upload_id, &detail) {
                    tracing::warn!(error = %mark_err, "could not mark upload as failed");
                }
                LoadOutcome::failed(detail)
            }
        }
    }
}
