//! Sample values shown next to each header on the review screen.

use std::collections::{BTreeMap, BTreeSet};

use agtrial_model::{RawRow, cell};

/// Default number of samples per header.
pub const DEFAULT_SAMPLE_LIMIT: usize = 5;

/// Up to `limit` distinct non-empty values of `header`, in first-seen order.
pub fn sample_values(rows: &[RawRow], header: &str, limit: usize) -> Vec<String> {
    let mut seen = BTreeSet::new();
    rows.iter()
        .map(|row| cell(row, header))
        .filter(|value| !value.is_empty())
        .filter(|value| seen.insert(*value))
        .take(limit)
        .map(str::to_string)
        .collect()
}

/// Sample values for each of `headers`.
pub fn sample_values_for(
    rows: &[RawRow],
    headers: &[String],
    limit: usize,
) -> BTreeMap<String, Vec<String>> {
    headers
        .iter()
        .map(|header| (header.clone(), sample_values(rows, header, limit)))
        .collect()
}
