//! TOML configuration and command-line value parsing.
//!
//! ```toml
//! database = "trials.db"
//! trial_id = "T24-07"
//!
//! [defaults]
//! crop = "wheat"
//! depth = "0-10"
//! ```
//!
//! Command-line flags take precedence over file values.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use agtrial_model::FieldValue;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Database used when neither a flag nor the config file names one.
pub const DEFAULT_DATABASE: &str = "agtrial.db";

/// Contents of the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database: Option<PathBuf>,
    pub trial_id: Option<String>,
    pub defaults: BTreeMap<String, FieldValue>,
}

impl AppConfig {
    /// Reads and parses a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parse config file {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the empty config.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Database path, preferring the command-line value.
    pub fn database(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.database.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
    }

    /// Trial id, preferring the command-line value.
    pub fn trial_id(&self, flag: Option<&str>) -> Option<String> {
        flag.map(str::to_string).or_else(|| self.trial_id.clone())
    }

    /// File defaults overlaid with command-line `FIELD=VALUE` pairs.
    pub fn defaults(&self, flags: &[(String, String)]) -> BTreeMap<String, FieldValue> {
        let mut defaults = self.defaults.clone();
        defaults.extend(flag_defaults(flags));
        defaults
    }
}

/// Defaults given as `FIELD=VALUE` flags.
pub fn flag_defaults(flags: &[(String, String)]) -> BTreeMap<String, FieldValue> {
    flags
        .iter()
        .map(|(field, raw)| (field.clone(), parse_default_value(raw)))
        .collect()
}

/// Parses `KEY=VALUE`; the key is trimmed and must not be empty.
pub fn parse_assignment(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Numbers become numeric defaults; anything else is text.
pub fn parse_default_value(raw: &str) -> FieldValue {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => FieldValue::Number(value),
        _ => FieldValue::Text(raw.trim().to_string()),
    }
}
