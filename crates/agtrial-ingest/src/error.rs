//! Error types for raw content parsing.

use thiserror::Error;

/// Errors that can occur while turning file bytes into rows.
///
/// Every variant is a parse failure scoped to a single file.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Content Errors ===
    /// No bytes, or nothing but blank lines.
    #[error("file is empty")]
    EmptyContent,

    /// Byte-order mark for an encoding we do not read.
    #[error("unsupported text encoding: {encoding} (save the file as UTF-8 CSV)")]
    UnsupportedEncoding { encoding: &'static str },

    /// A header row was found but nothing below it.
    #[error("file has a header row but no data rows")]
    NoDataRows,

    // === Header Errors ===
    /// Two columns share the same header text.
    #[error("duplicate column header '{header}' (columns {first} and {second})")]
    DuplicateHeader {
        header: String,
        first: usize,
        second: usize,
    },

    /// Column has data but no header text.
    #[error("column {column} contains values but has no header")]
    BlankHeader { column: usize },

    // === Reader Errors ===
    /// Delimited text could not be read.
    #[error("failed to read delimited text: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet could not be opened or read.
    #[error("failed to read spreadsheet: {0}")]
    Workbook(#[from] calamine::Error),

    /// Workbook contains no worksheet with any cells.
    #[error("spreadsheet has no worksheet with data")]
    NoSheets,
}

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, IngestError>;
