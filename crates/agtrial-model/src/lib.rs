//! Data model for field-trial lab data ingestion.
//!
//! This crate holds the types shared by every stage of the pipeline:
//!
//! - **Registry types**: [`ColumnMapConfig`] and [`ColumnSpec`] describe how a
//!   data type's columns are identified and loaded.
//! - **Bindings**: [`Binding`] and [`ColumnMap`] record how each source header
//!   was resolved (field, skipped, or forced metric).
//! - **Rows**: [`RawRow`] documents as parsed from the file and
//!   [`CanonicalRow`] values as loaded into the destination.
//! - **Uploads**: [`RawUpload`] is the staged, permanent provenance record.
//! - **Results**: [`FileResult`], [`BatchResult`] and [`LoadOutcome`] are the
//!   structured outcomes handed back to callers.

mod binding;
mod config;
mod enums;
mod error;
mod record;
mod result;
mod upload;

pub use binding::{Binding, ColumnMap, METRIC_TOKEN, Overrides, SKIP_TOKEN};
pub use config::{ColumnMapConfig, ColumnSpec};
pub use enums::{DataType, FileClass, PivotMode, SourceFormat, UploadStatus, ValueType};
pub use error::{ModelError, Result};
pub use record::{
    CanonicalRow, FieldValue, METRIC_FIELD, RawRow, UNIT_FIELD, VALUE_FIELD, cell, format_number,
};
pub use result::{BatchResult, FileResult, FileStatus, LoadOutcome, LoadStatus};
pub use upload::{NewUpload, RawUpload, UploadId};
