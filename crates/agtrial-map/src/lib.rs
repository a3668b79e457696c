//! Column map registry and header resolution.
//!
//! [`config_for`] returns the static configuration for a data type and
//! [`resolve_headers`] binds a file's headers to canonical fields, layering
//! review overrides on top. Both are pure; nothing here touches storage.

mod error;
mod registry;
mod resolve;
mod suggest;

pub use error::{MapError, Result};
pub use registry::{UNIT_PATTERN, all_configs, config_for, known_aliases, normalize_header};
pub use resolve::{HeaderResolution, infer_trial_id, resolve_headers};
pub use suggest::{FieldSuggestion, suggest_fields};
