//! Grid → header list and row documents.
//!
//! Both readers produce a grid of trimmed strings; everything about headers,
//! blank columns and empty rows is decided here so CSV and spreadsheet input
//! end up in exactly the same shape.

use std::collections::BTreeMap;

use agtrial_model::RawRow;
use serde_json::Value;

use crate::error::{IngestError, Result};

/// Parsed file content: headers in file order plus one document per data row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl ParsedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

pub(crate) fn build_table(grid: Vec<Vec<String>>) -> Result<ParsedTable> {
    let mut lines = grid
        .into_iter()
        .filter(|cells| cells.iter().any(|cell| !cell.is_empty()));

    let header_row = lines.next().ok_or(IngestError::EmptyContent)?;
    let body: Vec<Vec<String>> = lines.collect();

    let width = body
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(header_row.len()))
        .max()
        .unwrap_or(0);

    let mut columns: Vec<(usize, String)> = Vec::with_capacity(width);
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    for index in 0..width {
        let header = header_row.get(index).cloned().unwrap_or_default();
        if header.is_empty() {
            let has_values = body
                .iter()
                .any(|cells| cells.get(index).is_some_and(|c| !c.is_empty()));
            if has_values {
                return Err(IngestError::BlankHeader { column: index + 1 });
            }
            continue;
        }
        if let Some(first) = seen.insert(header.clone(), index + 1) {
            return Err(IngestError::DuplicateHeader {
                header,
                first,
                second: index + 1,
            });
        }
        columns.push((index, header));
    }

    let rows: Vec<RawRow> = body
        .iter()
        .map(|cells| {
            columns
                .iter()
                .map(|(index, header)| {
                    let value = cells.get(*index).cloned().unwrap_or_default();
                    (header.clone(), Value::String(value))
                })
                .collect()
        })
        .collect();

    if rows.is_empty() {
        return Err(IngestError::NoDataRows);
    }

    Ok(ParsedTable {
        headers: columns.into_iter().map(|(_, header)| header).collect(),
        rows,
    })
}
