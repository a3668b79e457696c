//! Delimited text reading (CSV, TSV, semicolon and pipe separated).

use std::borrow::Cow;

use csv::{ReaderBuilder, Trim};

use crate::error::{IngestError, Result};
use crate::table::{ParsedTable, build_table};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Parses delimited text into a table.
pub fn parse_delimited(bytes: &[u8]) -> Result<ParsedTable> {
    let text = decode_text(bytes)?;
    let delimiter = sniff_delimiter(&text);
    tracing::trace!(delimiter = %char::from(delimiter).escape_default(), "sniffed delimiter");

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }
    build_table(grid)
}

/// Decodes file bytes to text.
///
/// A UTF-8 BOM is stripped. Bytes that are not valid UTF-8 are read as
/// Latin-1, which is what older lab instruments export.
fn decode_text(bytes: &[u8]) -> Result<Cow<'_, str>> {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Err(IngestError::UnsupportedEncoding {
            encoding: "UTF-16 LE",
        });
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(IngestError::UnsupportedEncoding {
            encoding: "UTF-16 BE",
        });
    }
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(IngestError::EmptyContent);
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(Cow::Borrowed(text)),
        Err(_) => {
            tracing::warn!("content is not valid UTF-8, decoding as Latin-1");
            Ok(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()))
        }
    }
}

/// Picks the delimiter that occurs most often outside quotes on the first
/// non-blank line. Ties go to the earlier candidate; comma is the fallback.
pub fn sniff_delimiter(text: &str) -> u8 {
    let Some(line) = text.lines().find(|line| !line.trim().is_empty()) else {
        return b',';
    };

    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(slot) = CANDIDATE_DELIMITERS.iter().position(|&d| d == byte) {
            counts[slot] += 1;
        }
    }

    let mut best = 0;
    for slot in 1..counts.len() {
        if counts[slot] > counts[best] {
            best = slot;
        }
    }
    CANDIDATE_DELIMITERS[best]
}
