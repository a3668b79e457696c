//! Raw and canonical row representations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the measurement name in pivoted rows.
pub const METRIC_FIELD: &str = "metric";
/// Field holding the numeric measurement in pivoted rows.
pub const VALUE_FIELD: &str = "value";
/// Field holding the measurement unit in pivoted rows.
pub const UNIT_FIELD: &str = "unit";

/// A parsed source row keyed by original header text.
///
/// Shape varies per file, so rows stay schemaless JSON documents.
pub type RawRow = Map<String, Value>;

/// Returns the text of a raw cell, or `""` when absent or non-textual.
pub fn cell<'a>(row: &'a RawRow, header: &str) -> &'a str {
    row.get(header).and_then(Value::as_str).unwrap_or("")
}

/// Renders a number without a spurious fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// A typed canonical field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Number(f64),
    /// Text, including ISO-normalized dates.
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Number(_) => false,
        }
    }

    /// Text used when this value takes part in a natural key.
    ///
    /// Returns `None` for null or empty values.
    pub fn key_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(text) if text.is_empty() => None,
            FieldValue::Text(text) => Some(text.clone()),
            FieldValue::Number(number) => Some(format_number(*number)),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(number) => Some(*number),
            FieldValue::Null | FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Null | FieldValue::Number(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// A normalized row ready for loading, with its source row kept for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRow {
    pub fields: BTreeMap<String, FieldValue>,
    pub source: RawRow,
}

impl CanonicalRow {
    pub fn new(source: RawRow) -> Self {
        Self {
            fields: BTreeMap::new(),
            source,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    /// Text of a field, if it is textual.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_number)
    }
}
