//! Direct and wide-to-long transforms for field-trial lab files.
//!
//! [`transform`] resolves a file's headers through the column map registry,
//! then emits one canonical row per source row (direct mode) or one per
//! numeric measurement cell (pivot mode).

mod datetime;
mod engine;
mod error;
mod numeric;
mod unit;

pub use datetime::normalize_date;
pub use engine::{TransformInput, TransformOutput, coerce, transform};
pub use error::{Result, TransformError};
pub use numeric::parse_number;
pub use unit::UnitSplitter;
