//! Header bindings produced by column resolution and review overrides.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ModelError, Result};

/// Override token that excludes a header from output entirely.
pub const SKIP_TOKEN: &str = "__skip__";
/// Override token that forces pivot treatment of a header.
pub const METRIC_TOKEN: &str = "__metric__";

/// What a single source header resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Binding {
    /// Bound to a canonical field.
    Field(String),
    /// Excluded from output without producing a field.
    Skip,
    /// Treated as a measurement column in pivot mode.
    Metric,
}

impl Binding {
    /// Parses the textual form used in overrides and storage.
    pub fn parse(header: &str, raw: &str) -> Result<Self> {
        match raw.trim() {
            "" => Err(ModelError::EmptyBinding {
                header: header.to_string(),
            }),
            SKIP_TOKEN => Ok(Binding::Skip),
            METRIC_TOKEN => Ok(Binding::Metric),
            field => Ok(Binding::Field(field.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Binding::Field(field) => field,
            Binding::Skip => SKIP_TOKEN,
            Binding::Metric => METRIC_TOKEN,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            Binding::Field(field) => Some(field),
            Binding::Skip | Binding::Metric => None,
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Binding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Binding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Binding::parse("", &raw).map_err(serde::de::Error::custom)
    }
}

/// Header → binding resolution actually applied to a file.
///
/// Keyed by original header text. A `BTreeMap` keeps serialization stable.
pub type ColumnMap = BTreeMap<String, Binding>;

/// User-supplied header → binding overrides from a review step.
pub type Overrides = BTreeMap<String, Binding>;
