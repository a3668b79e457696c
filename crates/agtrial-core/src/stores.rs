use std::sync::Arc;

use agtrial_store::{HistoryEntry, RecordSink, StagingStore, UploadLog};

/// The storage seams shared by the orchestrator and the review resolver.
#[derive(Clone)]
pub struct Stores {
    pub staging: Arc<dyn StagingStore>,
    pub sink: Arc<dyn RecordSink>,
    pub log: Arc<dyn UploadLog>,
}

impl Stores {
    pub fn new(
        staging: Arc<dyn StagingStore>,
        sink: Arc<dyn RecordSink>,
        log: Arc<dyn UploadLog>,
    ) -> Self {
        Self { staging, sink, log }
    }

    /// One store serving every seam, e.g. `SqliteStore`.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: StagingStore + RecordSink + UploadLog + 'static,
    {
        Self {
            staging: store.clone(),
            sink: store.clone(),
            log: store,
        }
    }

    /// Writes an audit entry. Failures are logged and otherwise ignored.
    pub(crate) fn record_history(&self, entry: &HistoryEntry) {
        if let Err(err) = self.log.record(entry) {
            tracing::warn!(
                filename = %entry.filename,
                error = %err,
                "failed to record upload history"
            );
        }
    }
}
