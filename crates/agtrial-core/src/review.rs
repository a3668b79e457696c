//! Column review: show a staged upload's unresolved headers, accept the
//! reviewer's mapping and re-run the file from its stored rows.

use std::collections::{BTreeMap, BTreeSet};

use agtrial_ingest::{DEFAULT_SAMPLE_LIMIT, sample_values_for};
use agtrial_map::{FieldSuggestion, config_for, suggest_fields};
use agtrial_model::{
    Binding, ColumnMap, DataType, FieldValue, FileResult, Overrides, UploadId, UploadStatus,
    ValueType,
};
use agtrial_store::HistoryEntry;
use agtrial_transform::{TransformInput, transform};
use serde::Serialize;
use tracing::info_span;

use crate::error::{PipelineError, Result};
use crate::pipeline::load;
use crate::stores::Stores;

/// A canonical field the reviewer can map a header to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewField {
    pub field: &'static str,
    pub value_type: ValueType,
    /// Header currently bound to the field, if any.
    pub header: Option<String>,
}

/// Everything the review screen needs for one upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewPayload {
    pub upload_id: UploadId,
    pub filename: String,
    pub data_type: DataType,
    pub status: UploadStatus,
    pub error_detail: Option<String>,
    pub headers: Vec<String>,
    /// Current binding of every resolved header.
    pub column_map: ColumnMap,
    pub unmapped_columns: Vec<String>,
    pub sample_values: BTreeMap<String, Vec<String>>,
    /// Candidate fields for each unmapped header, best first.
    pub suggestions: BTreeMap<String, Vec<FieldSuggestion>>,
    pub fields: Vec<ReviewField>,
}

/// Layers new overrides over a stored column map.
///
/// New entries win per header. A stored entry is also dropped when a new
/// override claims the same field, so a field never ends up bound twice.
pub fn merge_overrides(stored: &ColumnMap, overrides: &Overrides) -> Overrides {
    let claimed: BTreeSet<&str> = overrides.values().filter_map(Binding::field).collect();
    let mut merged: Overrides = stored
        .iter()
        .filter(|(header, binding)| {
            !overrides.contains_key(*header)
                && !binding.field().is_some_and(|field| claimed.contains(field))
        })
        .map(|(header, binding)| (header.clone(), binding.clone()))
        .collect();
    merged.extend(
        overrides
            .iter()
            .map(|(header, binding)| (header.clone(), binding.clone())),
    );
    merged
}

/// Fetches review payloads and re-runs uploads with reviewer overrides.
#[derive(Clone)]
pub struct ReviewResolver {
    stores: Stores,
    defaults: BTreeMap<String, FieldValue>,
}

impl ReviewResolver {
    pub fn new(stores: Stores) -> Self {
        Self {
            stores,
            defaults: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: BTreeMap<String, FieldValue>) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn fetch(&self, id: UploadId) -> Result<ReviewPayload> {
        let upload = self.stores.staging.fetch(id)?;
        let config = config_for(upload.data_type);

        let sample_values =
            sample_values_for(&upload.raw_rows, &upload.headers, DEFAULT_SAMPLE_LIMIT);
        let suggestions = upload
            .unmapped_columns
            .iter()
            .map(|header| (header.clone(), suggest_fields(header, config)))
            .collect();
        let fields = config
            .bindable_columns()
            .map(|spec| ReviewField {
                field: spec.field,
                value_type: spec.value_type,
                header: upload
                    .column_map
                    .iter()
                    .find(|(_, binding)| binding.field() == Some(spec.field))
                    .map(|(header, _)| header.clone()),
            })
            .collect();

        Ok(ReviewPayload {
            upload_id: upload.id,
            filename: upload.filename,
            data_type: upload.data_type,
            status: upload.status,
            error_detail: upload.error_detail,
            headers: upload.headers,
            column_map: upload.column_map,
            unmapped_columns: upload.unmapped_columns,
            sample_values,
            suggestions,
            fields,
        })
    }

    /// Re-runs a staged upload with `overrides` merged over its stored map.
    ///
    /// Uploads in any status can be re-entered; empty overrides retry the
    /// load with the stored mapping. Defaults stored at ingest apply, with
    /// the resolver's own defaults layered on top. Headers still unresolved
    /// are recorded as skipped. A mapping failure leaves the stored upload
    /// untouched.
    ///
    /// Returns an error only when the upload cannot be read.
    pub fn reprocess(&self, id: UploadId, overrides: &Overrides) -> Result<FileResult> {
        let span = info_span!("reprocess", raw_upload_id = %id, overrides = overrides.len());
        let _guard = span.enter();

        let upload = self.stores.staging.fetch(id)?;
        let config = config_for(upload.data_type);
        let merged = merge_overrides(&upload.column_map, overrides);
        let mut defaults = upload.defaults.clone();
        defaults.extend(self.defaults.clone());

        let output = transform(&TransformInput {
            rows: &upload.raw_rows,
            headers: &upload.headers,
            config,
            overrides: &merged,
            extra_defaults: &defaults,
        });
        let result = match output {
            Ok(output) => {
                let mut column_map = output.column_map;
                for header in output.unmapped_columns {
                    tracing::debug!(header = %header, "unresolved column skipped");
                    column_map.insert(header, Binding::Skip);
                }
                match self.stores.staging.apply_overrides(id, &column_map) {
                    Ok(()) => load(
                        &self.stores,
                        id,
                        upload.data_type,
                        &upload.trial_id,
                        &upload.filename,
                        output.rows,
                    ),
                    Err(err) => Err(err.into()),
                }
            }
            Err(err) => Err(PipelineError::from(err)),
        };

        let result = result.unwrap_or_else(|err| {
            tracing::warn!(kind = err.kind(), error = %err, "reprocess failed");
            FileResult::error(&upload.filename, Some(upload.data_type), err.user_message())
                .with_upload(id)
        });
        self.stores.record_history(&HistoryEntry {
            trial_id: Some(upload.trial_id.clone()),
            filename: upload.filename.clone(),
            file_type: Some(upload.data_type),
            status: result.status,
            record_count: result.record_count,
            detail: result.detail.clone(),
            content_sha256: Some(upload.content_sha256.clone()),
        });
        Ok(result)
    }
}
