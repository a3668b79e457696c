//! Declarative column map configuration.

use serde::Serialize;

use crate::enums::{DataType, PivotMode, ValueType};
use crate::record::{METRIC_FIELD, UNIT_FIELD, VALUE_FIELD};

/// One canonical field and the header aliases that resolve to it.
///
/// Aliases are written lower-cased; matching normalizes header text the same way.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ColumnSpec {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
    pub value_type: ValueType,
}

impl ColumnSpec {
    pub const fn new(
        field: &'static str,
        aliases: &'static [&'static str],
        value_type: ValueType,
    ) -> Self {
        Self {
            field,
            aliases,
            value_type,
        }
    }
}

/// Static column map configuration for one data type.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ColumnMapConfig {
    pub data_type: DataType,
    /// Destination table the canonical rows are loaded into.
    pub target_table: &'static str,
    /// Coverage flag set after a successful load.
    pub file_type_tag: &'static str,
    pub pivot_mode: PivotMode,
    /// Always mapped 1:1 regardless of pivot mode.
    pub identity_columns: &'static [ColumnSpec],
    /// Direct mode only.
    pub value_columns: &'static [ColumnSpec],
    /// Pivot mode only: headers excluded from pivoting without producing a field.
    pub extra_identity_aliases: &'static [&'static str],
    /// Regex with `metric` and `unit` named groups.
    pub unit_pattern: &'static str,
    /// Dedup key fields, excluding the owning trial.
    pub natural_key_fields: &'static [&'static str],
    /// Key fields that may be blank; a blank one keys as empty text.
    pub optional_key_fields: &'static [&'static str],
    /// Headers whose first non-empty value names the owning trial.
    pub trial_id_aliases: &'static [&'static str],
}

impl ColumnMapConfig {
    pub fn is_pivot(&self) -> bool {
        self.pivot_mode == PivotMode::WideToLong
    }

    /// Column specs that participate in header binding for this mode.
    pub fn bindable_columns(&self) -> impl Iterator<Item = &'static ColumnSpec> {
        let values: &'static [ColumnSpec] = if self.is_pivot() {
            &[]
        } else {
            self.value_columns
        };
        self.identity_columns.iter().chain(values.iter())
    }

    pub fn spec_for(&self, field: &str) -> Option<&'static ColumnSpec> {
        self.bindable_columns().find(|spec| spec.field == field)
    }

    /// True when `field` can appear in a canonical row produced by this config.
    pub fn produces_field(&self, field: &str) -> bool {
        if self.spec_for(field).is_some() {
            return true;
        }
        self.is_pivot() && [METRIC_FIELD, VALUE_FIELD, UNIT_FIELD].contains(&field)
    }

    pub fn is_optional_key(&self, field: &str) -> bool {
        self.optional_key_fields.contains(&field)
    }
}
