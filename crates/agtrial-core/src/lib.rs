//! Ingestion orchestration for field-trial lab files.
//!
//! [`Pipeline::process_batch`] takes a batch of uploaded files and runs each
//! one through parsing, column mapping, staging and loading. Files whose
//! columns cannot all be matched are staged for review;
//! [`ReviewResolver`] serves the review screen and re-runs them once a
//! reviewer has mapped the remaining headers.

mod error;
mod pipeline;
mod review;
mod stores;

pub use error::{PipelineError, Result};
pub use pipeline::{FileInput, Pipeline, PipelineOptions};
pub use review::{ReviewField, ReviewPayload, ReviewResolver, merge_overrides};
pub use stores::Stores;
