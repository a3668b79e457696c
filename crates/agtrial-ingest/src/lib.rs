//! Raw content parsing for field-trial lab files.
//!
//! [`parse_content`] turns file bytes into an ordered header list and one
//! JSON document per data row, keyed by original header text. Delimited text
//! and spreadsheets normalize to the same shape; nothing here knows about
//! canonical fields.

mod classify;
mod delimited;
mod error;
mod hash;
mod hints;
mod spreadsheet;
mod table;

use agtrial_model::SourceFormat;

pub use classify::{classify_filename, source_format};
pub use delimited::{parse_delimited, sniff_delimiter};
pub use error::{IngestError, Result};
pub use hash::content_sha256;
pub use hints::{DEFAULT_SAMPLE_LIMIT, sample_values, sample_values_for};
pub use spreadsheet::parse_spreadsheet;
pub use table::ParsedTable;

/// Parses file bytes in the given structural format.
///
/// Fails with [`IngestError::NoDataRows`] when a header row exists but no
/// data rows follow it.
pub fn parse_content(bytes: &[u8], format: SourceFormat) -> Result<ParsedTable> {
    let table = match format {
        SourceFormat::Delimited => parse_delimited(bytes)?,
        SourceFormat::Spreadsheet => parse_spreadsheet(bytes)?,
    };
    tracing::debug!(
        ?format,
        columns = table.headers.len(),
        rows = table.rows.len(),
        "parsed content"
    );
    Ok(table)
}
