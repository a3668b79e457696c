//! Spreadsheet reading via calamine (xlsx, xlsm, xlsb, xls, ods).

use std::io::Cursor;

use agtrial_model::format_number;
use calamine::{Data, DataType as _, Reader, open_workbook_auto_from_rs};
use chrono::{NaiveDateTime, Timelike};

use crate::error::{IngestError, Result};
use crate::table::{ParsedTable, build_table};

/// Parses the first worksheet that has any non-empty cell.
pub fn parse_spreadsheet(bytes: &[u8]) -> Result<ParsedTable> {
    if bytes.is_empty() {
        return Err(IngestError::EmptyContent);
    }
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let sheet_names = workbook.sheet_names().to_vec();
    for name in &sheet_names {
        let range = workbook.worksheet_range(name)?;
        if range.used_cells().all(|(_, _, cell)| stringify_cell(cell).is_empty()) {
            tracing::debug!(sheet = %name, "skipping empty worksheet");
            continue;
        }
        tracing::debug!(sheet = %name, rows = range.height(), "reading worksheet");
        let grid = range
            .rows()
            .map(|row| row.iter().map(stringify_cell).collect())
            .collect();
        return build_table(grid);
    }
    Err(IngestError::NoSheets)
}

/// Renders a cell as the trimmed text a user would see.
fn stringify_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        Data::Float(value) => format_number(*value),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(format_datetime)
            .unwrap_or_else(|| cell.to_string()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => text.trim().to_string(),
        Data::Error(err) => err.to_string(),
    }
}

fn format_datetime(value: NaiveDateTime) -> String {
    if value.time().num_seconds_from_midnight() == 0 {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}
