//! Durable storage for field-trial ingestion.
//!
//! # Features
//!
//! - **Staging** of parsed files so column review can happen later without
//!   re-reading the original bytes
//! - **Atomic loading** with in-batch duplicate collapse and a transactional
//!   natural-key upsert
//! - **Coverage flags** per trial and file type, set only by successful loads
//! - **Upload history** as a best-effort audit trail
//!
//! # Architecture
//!
//! - `traits.rs` - [`StagingStore`], [`RecordSink`] and [`UploadLog`] seams
//! - `sqlite.rs` - [`SqliteStore`], the rusqlite implementation of all three
//! - `loader.rs` - [`AtomicLoader`] and natural-key handling
//! - `error.rs` - Error types with user-friendly messages

mod error;
mod loader;
mod sqlite;
mod traits;

pub use error::{Result, StoreError};
pub use loader::{AtomicLoader, LoadRequest, collapse_duplicates, natural_key};
pub use sqlite::SqliteStore;
pub use traits::{
    CoverageEntry, HistoryEntry, KeyedRow, LoadBatch, RecordSink, StagingStore, UploadLog,
};
