//! Header resolution: `(headers, config, overrides) -> mapping`.

use std::collections::{BTreeMap, BTreeSet};

use agtrial_model::{Binding, ColumnMap, ColumnMapConfig, Overrides, RawRow, cell};

use crate::error::{MapError, Result};
use crate::registry::{known_aliases, normalize_header};

/// Outcome of resolving one file's headers against a configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderResolution {
    /// Every header that received a binding.
    pub column_map: ColumnMap,
    /// Canonical field → the single header bound to it.
    pub field_headers: BTreeMap<String, String>,
    /// Direct mode only: headers neither bound nor recognised. File order.
    pub unmapped: Vec<String>,
}

impl HeaderResolution {
    pub fn header_for(&self, field: &str) -> Option<&str> {
        self.field_headers.get(field).map(String::as_str)
    }

    pub fn binding(&self, header: &str) -> Option<&Binding> {
        self.column_map.get(header)
    }

    fn bind_field(&mut self, header: &str, field: &str) {
        self.release(header);
        if let Some(previous) = self.field_headers.insert(field.to_string(), header.to_string()) {
            self.column_map.insert(previous, Binding::Skip);
        }
        self.column_map
            .insert(header.to_string(), Binding::Field(field.to_string()));
    }

    fn bind_special(&mut self, header: &str, binding: Binding) {
        self.release(header);
        self.column_map.insert(header.to_string(), binding);
    }

    /// Frees the field currently held by `header`, if any.
    fn release(&mut self, header: &str) {
        if let Some(Binding::Field(field)) = self.column_map.get(header) {
            self.field_headers.remove(field);
        }
    }
}

/// Resolves `headers` to canonical fields.
///
/// Identity columns bind first, then value columns (direct mode only). For
/// each column spec the first header in file order whose normalized text is
/// one of its aliases wins; a header binds at most once. In pivot mode,
/// headers naming identity, extra identity or trial-id aliases that did not
/// bind are skipped so they never become metrics. Overrides apply last and
/// take precedence; a field override displaces the header that held the
/// field, which is then skipped.
pub fn resolve_headers(
    headers: &[String],
    config: &ColumnMapConfig,
    overrides: &Overrides,
) -> Result<HeaderResolution> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut resolution = HeaderResolution::default();

    for spec in config.bindable_columns() {
        let aliases: BTreeSet<String> = spec.aliases.iter().map(|a| normalize_header(a)).collect();
        let found = headers
            .iter()
            .zip(&normalized)
            .find(|(header, norm)| {
                !resolution.column_map.contains_key(header.as_str()) && aliases.contains(*norm)
            })
            .map(|(header, _)| header.clone());
        if let Some(header) = found {
            resolution.bind_field(&header, spec.field);
        }
    }

    let known = known_aliases(config);
    if config.is_pivot() {
        for (header, norm) in headers.iter().zip(&normalized) {
            if !resolution.column_map.contains_key(header) && known.contains(norm) {
                resolution.bind_special(header, Binding::Skip);
            }
        }
    }

    for (header, binding) in overrides {
        if !headers.contains(header) {
            return Err(MapError::UnknownHeader {
                header: header.clone(),
            });
        }
        match binding {
            Binding::Field(field) => {
                if config.spec_for(field).is_none() {
                    return Err(MapError::UnknownField {
                        header: header.clone(),
                        field: field.clone(),
                        data_type: config.data_type,
                    });
                }
                resolution.bind_field(header, field);
            }
            Binding::Skip | Binding::Metric => resolution.bind_special(header, binding.clone()),
        }
    }

    if !config.is_pivot() {
        resolution.unmapped = headers
            .iter()
            .zip(&normalized)
            .filter(|(header, norm)| {
                !resolution.column_map.contains_key(header.as_str()) && !known.contains(*norm)
            })
            .map(|(header, _)| header.clone())
            .collect();
    }

    tracing::debug!(
        data_type = %config.data_type,
        bound = resolution.field_headers.len(),
        unmapped = resolution.unmapped.len(),
        "resolved headers"
    );
    Ok(resolution)
}

/// Infers the owning trial from the first non-empty trial-id cell.
///
/// Headers are tried in file order; within a header, rows in order.
pub fn infer_trial_id(
    rows: &[RawRow],
    headers: &[String],
    config: &ColumnMapConfig,
) -> Option<String> {
    let aliases: BTreeSet<String> = config
        .trial_id_aliases
        .iter()
        .map(|a| normalize_header(a))
        .collect();
    headers
        .iter()
        .filter(|header| aliases.contains(&normalize_header(header)))
        .find_map(|header| {
            rows.iter()
                .map(|row| cell(row, header).trim())
                .find(|value| !value.is_empty())
                .map(str::to_string)
        })
}
