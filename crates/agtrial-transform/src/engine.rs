//! Transform engine: raw rows → canonical rows.

use std::collections::BTreeMap;

use agtrial_map::{HeaderResolution, resolve_headers};
use agtrial_model::{
    Binding, CanonicalRow, ColumnMap, ColumnMapConfig, ColumnSpec, FieldValue, METRIC_FIELD,
    Overrides, RawRow, UNIT_FIELD, VALUE_FIELD, ValueType, cell,
};

use crate::datetime::normalize_date;
use crate::error::{Result, TransformError};
use crate::numeric::parse_number;
use crate::unit::UnitSplitter;

/// Everything one transform run needs.
#[derive(Debug, Clone, Copy)]
pub struct TransformInput<'a> {
    pub rows: &'a [RawRow],
    pub headers: &'a [String],
    pub config: &'a ColumnMapConfig,
    /// Review overrides layered on top of alias resolution.
    pub overrides: &'a Overrides,
    /// Static values for fields that are absent or empty in a row.
    pub extra_defaults: &'a BTreeMap<String, FieldValue>,
}

/// Canonical rows plus the mapping that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub rows: Vec<CanonicalRow>,
    pub column_map: ColumnMap,
    /// Direct mode only; always empty for pivoted data.
    pub unmapped_columns: Vec<String>,
}

/// Coerces a raw cell to the declared value type.
///
/// Strings are trimmed and default to `""`. Numbers that fail to parse are
/// null. Dates are ISO-normalized, or passed through unchanged so
/// downstream validation can see the original text.
pub fn coerce(raw: &str, value_type: ValueType) -> FieldValue {
    let trimmed = raw.trim();
    match value_type {
        ValueType::String => FieldValue::Text(trimmed.to_string()),
        ValueType::Number => parse_number(trimmed).map_or(FieldValue::Null, FieldValue::Number),
        ValueType::Date if trimmed.is_empty() => FieldValue::Null,
        ValueType::Date => {
            FieldValue::Text(normalize_date(trimmed).unwrap_or_else(|| trimmed.to_string()))
        }
    }
}

/// Runs header resolution and the configured transform.
pub fn transform(input: &TransformInput<'_>) -> Result<TransformOutput> {
    let config = input.config;
    let resolution = resolve_headers(input.headers, config, input.overrides)?;

    let rows = if config.is_pivot() {
        pivot_rows(input, &resolution)?
    } else {
        direct_rows(input, &resolution)
    };

    if rows.is_empty() {
        return Err(TransformError::NoRows {
            data_type: config.data_type,
            input_rows: input.rows.len(),
            reason: empty_reason(input, &resolution),
        });
    }

    tracing::debug!(
        data_type = %config.data_type,
        input_rows = input.rows.len(),
        output_rows = rows.len(),
        unmapped = resolution.unmapped.len(),
        "transform complete"
    );

    Ok(TransformOutput {
        rows,
        column_map: resolution.column_map,
        unmapped_columns: resolution.unmapped,
    })
}

fn resolve_fields<'s>(
    specs: impl Iterator<Item = &'s ColumnSpec>,
    row: &RawRow,
    resolution: &HeaderResolution,
    out: &mut CanonicalRow,
) {
    for spec in specs {
        let value = match resolution.header_for(spec.field) {
            Some(header) => coerce(cell(row, header), spec.value_type),
            None => FieldValue::Null,
        };
        out.set(spec.field, value);
    }
}

/// Builds the identity portion of a row, or `None` when every identity
/// field is empty.
fn identity_row(
    row: &RawRow,
    config: &ColumnMapConfig,
    resolution: &HeaderResolution,
) -> Option<CanonicalRow> {
    let mut out = CanonicalRow::new(row.clone());
    resolve_fields(config.identity_columns.iter(), row, resolution, &mut out);
    let has_identity = config
        .identity_columns
        .iter()
        .any(|spec| out.get(spec.field).is_some_and(|v| !v.is_null()));
    has_identity.then_some(out)
}

fn apply_defaults(row: &mut CanonicalRow, defaults: &BTreeMap<String, FieldValue>) {
    for (field, value) in defaults {
        let missing = row.get(field).is_none_or(FieldValue::is_null);
        if missing {
            row.set(field.clone(), value.clone());
        }
    }
}

fn direct_rows(input: &TransformInput<'_>, resolution: &HeaderResolution) -> Vec<CanonicalRow> {
    let config = input.config;
    input
        .rows
        .iter()
        .filter_map(|row| {
            let mut out = identity_row(row, config, resolution)?;
            resolve_fields(config.value_columns.iter(), row, resolution, &mut out);
            apply_defaults(&mut out, input.extra_defaults);
            Some(out)
        })
        .collect()
}

fn pivot_rows(
    input: &TransformInput<'_>,
    resolution: &HeaderResolution,
) -> Result<Vec<CanonicalRow>> {
    let config = input.config;
    let splitter =
        UnitSplitter::new(config.unit_pattern).map_err(|source| TransformError::UnitPattern {
            data_type: config.data_type,
            source,
        })?;

    // Metric candidates: unbound headers and forced metrics, in file order.
    let metrics: Vec<(&String, String, String)> = input
        .headers
        .iter()
        .filter(|header| matches!(resolution.binding(header), None | Some(Binding::Metric)))
        .map(|header| {
            let (metric, unit) = splitter.split(header);
            (header, metric, unit)
        })
        .collect();

    let mut rows = Vec::new();
    for row in input.rows {
        let Some(identity) = identity_row(row, config, resolution) else {
            continue;
        };
        for (header, metric, unit) in &metrics {
            let Some(value) = parse_number(cell(row, header)) else {
                continue;
            };
            let mut out = identity.clone();
            out.set(METRIC_FIELD, FieldValue::Text(metric.clone()));
            out.set(VALUE_FIELD, FieldValue::Number(value));
            out.set(UNIT_FIELD, FieldValue::Text(unit.clone()));
            apply_defaults(&mut out, input.extra_defaults);
            rows.push(out);
        }
    }
    Ok(rows)
}

fn empty_reason(input: &TransformInput<'_>, resolution: &HeaderResolution) -> String {
    if input.rows.is_empty() {
        return "the file has no data rows".to_string();
    }
    let unbound: Vec<&str> = input
        .config
        .identity_columns
        .iter()
        .map(|spec| spec.field)
        .filter(|field| resolution.header_for(field).is_none())
        .collect();
    if unbound.len() == input.config.identity_columns.len() {
        return format!(
            "no column matched the identity field(s) {}",
            unbound.join(", ")
        );
    }
    if input.config.is_pivot() {
        return "no numeric measurement values were found".to_string();
    }
    "every row is missing its identity values".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_by_type() {
        assert_eq!(coerce("  S1 ", ValueType::String), FieldValue::from("S1"));
        assert_eq!(coerce("", ValueType::String), FieldValue::from(""));
        assert_eq!(coerce("4.2", ValueType::Number), FieldValue::Number(4.2));
        assert_eq!(coerce("n/a", ValueType::Number), FieldValue::Null);
        assert_eq!(coerce("", ValueType::Number), FieldValue::Null);
        assert_eq!(
            coerce("05/03/2024", ValueType::Date),
            FieldValue::from("2024-03-05")
        );
        assert_eq!(coerce("spring", ValueType::Date), FieldValue::from("spring"));
        assert_eq!(coerce(" ", ValueType::Date), FieldValue::Null);
    }
}
