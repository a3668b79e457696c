//! Static column map registry.
//!
//! One [`ColumnMapConfig`] per [`DataType`]. Lookup is an exhaustive match,
//! so a new data type cannot be added without registering its configuration.

use std::collections::BTreeSet;

use agtrial_model::{ColumnMapConfig, ColumnSpec, DataType, PivotMode, ValueType};

/// Splits a trailing `(unit)` annotation off a header.
pub const UNIT_PATTERN: &str = r"^(?P<metric>.*?)\s*\((?P<unit>[^()]*)\)\s*$";

const SAMPLE_NO_ALIASES: &[&str] = &[
    "sample no",
    "sample_no",
    "sample number",
    "sample id",
    "sample",
    "lab no",
    "lab number",
];

const SAMPLE_DATE_ALIASES: &[&str] = &[
    "sample date",
    "sample_date",
    "date sampled",
    "sampling date",
    "date",
];

const TRIAL_ID_ALIASES: &[&str] = &["trial id", "trial_id", "trial code", "trial number", "trial"];

static TRIAL_SUMMARY: ColumnMapConfig = ColumnMapConfig {
    data_type: DataType::TrialSummary,
    target_table: "treatments",
    file_type_tag: "trial_summary",
    pivot_mode: PivotMode::Direct,
    identity_columns: &[ColumnSpec::new(
        "treatment_number",
        &[
            "treatment number",
            "treatment no",
            "trt no",
            "trt",
            "treatment",
            "trt_no",
            "treatment_number",
        ],
        ValueType::String,
    )],
    value_columns: &[
        ColumnSpec::new(
            "treatment_name",
            &["treatment name", "treatment_name", "description", "name"],
            ValueType::String,
        ),
        ColumnSpec::new("product", &["product", "product name", "chemical"], ValueType::String),
        ColumnSpec::new("rate", &["rate", "application rate"], ValueType::Number),
        ColumnSpec::new(
            "rate_unit",
            &["rate unit", "rate_unit", "unit", "units"],
            ValueType::String,
        ),
        ColumnSpec::new(
            "application_timing",
            &["timing", "application timing", "application_timing", "applied"],
            ValueType::String,
        ),
    ],
    extra_identity_aliases: &[],
    unit_pattern: UNIT_PATTERN,
    natural_key_fields: &["treatment_number"],
    optional_key_fields: &[],
    trial_id_aliases: TRIAL_ID_ALIASES,
};

static SOIL_CHEMISTRY: ColumnMapConfig = ColumnMapConfig {
    data_type: DataType::SoilChemistry,
    target_table: "soil_chemistry",
    file_type_tag: "soil_chemistry",
    pivot_mode: PivotMode::WideToLong,
    identity_columns: &[
        ColumnSpec::new("sample_no", SAMPLE_NO_ALIASES, ValueType::String),
        ColumnSpec::new("sample_date", SAMPLE_DATE_ALIASES, ValueType::Date),
        ColumnSpec::new("block", &["block", "blk", "zone"], ValueType::String),
        ColumnSpec::new(
            "depth",
            &["depth", "sample depth", "depth (cm)", "depth cm"],
            ValueType::String,
        ),
    ],
    value_columns: &[],
    extra_identity_aliases: &["paddock", "site", "location", "customer", "client", "crop"],
    unit_pattern: UNIT_PATTERN,
    natural_key_fields: &["sample_no", "sample_date", "depth", "metric", "unit"],
    optional_key_fields: &["sample_date", "depth", "unit"],
    trial_id_aliases: &[],
};

static TISSUE_CHEMISTRY: ColumnMapConfig = ColumnMapConfig {
    data_type: DataType::TissueChemistry,
    target_table: "tissue_chemistry",
    file_type_tag: "tissue_chemistry",
    pivot_mode: PivotMode::WideToLong,
    identity_columns: &[
        ColumnSpec::new("sample_no", SAMPLE_NO_ALIASES, ValueType::String),
        ColumnSpec::new("sample_date", SAMPLE_DATE_ALIASES, ValueType::Date),
        ColumnSpec::new("plot", &["plot", "plot no", "plot number"], ValueType::String),
        ColumnSpec::new(
            "growth_stage",
            &["growth stage", "growth_stage", "stage", "gs"],
            ValueType::String,
        ),
    ],
    value_columns: &[],
    extra_identity_aliases: &[
        "paddock", "site", "location", "customer", "client", "crop", "plant part", "tissue",
    ],
    unit_pattern: UNIT_PATTERN,
    natural_key_fields: &["sample_no", "sample_date", "growth_stage", "metric", "unit"],
    optional_key_fields: &["sample_date", "growth_stage", "unit"],
    trial_id_aliases: &[],
};

static PLOT_DATA: ColumnMapConfig = ColumnMapConfig {
    data_type: DataType::PlotData,
    target_table: "plot_data",
    file_type_tag: "plot_data",
    pivot_mode: PivotMode::Direct,
    identity_columns: &[
        ColumnSpec::new("plot", &["plot", "plot no", "plot number", "plot_id"], ValueType::String),
        ColumnSpec::new(
            "assessment_date",
            &["assessment date", "assessment_date", "date", "date assessed"],
            ValueType::Date,
        ),
    ],
    value_columns: &[
        ColumnSpec::new(
            "treatment_number",
            &["treatment", "trt", "trt no", "treatment number", "treatment_number"],
            ValueType::String,
        ),
        ColumnSpec::new("rep", &["rep", "replicate", "replication", "block"], ValueType::Number),
        ColumnSpec::new(
            "yield_t_ha",
            &["yield", "yield (t/ha)", "yield t/ha", "yield_t_ha"],
            ValueType::Number,
        ),
        ColumnSpec::new(
            "plant_count",
            &["plant count", "plant_count", "plants", "establishment"],
            ValueType::Number,
        ),
        ColumnSpec::new(
            "height_cm",
            &["height", "height (cm)", "plant height", "height_cm"],
            ValueType::Number,
        ),
        ColumnSpec::new("notes", &["notes", "comments", "comment"], ValueType::String),
    ],
    extra_identity_aliases: &[],
    unit_pattern: UNIT_PATTERN,
    natural_key_fields: &["plot", "assessment_date"],
    optional_key_fields: &[],
    trial_id_aliases: &[],
};

/// Returns the static configuration for a data type.
pub fn config_for(data_type: DataType) -> &'static ColumnMapConfig {
    match data_type {
        DataType::TrialSummary => &TRIAL_SUMMARY,
        DataType::SoilChemistry => &SOIL_CHEMISTRY,
        DataType::TissueChemistry => &TISSUE_CHEMISTRY,
        DataType::PlotData => &PLOT_DATA,
    }
}

/// Every registered configuration, in [`DataType::ALL`] order.
pub fn all_configs() -> impl Iterator<Item = &'static ColumnMapConfig> {
    DataType::ALL.into_iter().map(config_for)
}

/// Lower-cases, trims and collapses internal whitespace.
pub fn normalize_header(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Every alias the configuration knows about, normalized.
///
/// Includes identity, value, extra identity and trial-id aliases. Headers in
/// this set are "known but maybe not mapped"; anything else is unknown.
pub fn known_aliases(config: &ColumnMapConfig) -> BTreeSet<String> {
    let columns = config.identity_columns.iter().chain(config.value_columns);
    columns
        .flat_map(|spec| spec.aliases.iter())
        .chain(config.extra_identity_aliases)
        .chain(config.trial_id_aliases)
        .map(|alias| normalize_header(alias))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_data_type_is_registered_once() {
        let tables: BTreeSet<_> = all_configs().map(|c| c.target_table).collect();
        assert_eq!(tables.len(), DataType::ALL.len());
        for data_type in DataType::ALL {
            assert_eq!(config_for(data_type).data_type, data_type);
        }
    }

    #[test]
    fn natural_keys_name_produced_fields() {
        for config in all_configs() {
            for field in config.natural_key_fields {
                assert!(
                    config.produces_field(field),
                    "{} natural key field '{field}' is never produced",
                    config.data_type
                );
            }
        }
    }

    #[test]
    fn optional_key_fields_are_key_fields() {
        for config in all_configs() {
            for field in config.optional_key_fields {
                assert!(config.natural_key_fields.contains(field));
            }
        }
    }

    #[test]
    fn sampling_context_is_part_of_pivot_keys() {
        let soil = config_for(DataType::SoilChemistry);
        assert!(soil.natural_key_fields.contains(&"depth"));
        assert!(soil.natural_key_fields.contains(&"unit"));
        let tissue = config_for(DataType::TissueChemistry);
        assert!(tissue.natural_key_fields.contains(&"growth_stage"));
        assert!(tissue.natural_key_fields.contains(&"sample_date"));
    }

    #[test]
    fn aliases_are_stored_normalized() {
        for config in all_configs() {
            for alias in known_aliases(config) {
                assert_eq!(alias, normalize_header(&alias));
            }
        }
    }

    #[test]
    fn normalizes_case_and_spacing() {
        assert_eq!(normalize_header("  Sample   No "), "sample no");
        assert_eq!(normalize_header("pH (1:5)"), "ph (1:5)");
    }

    #[test]
    fn known_aliases_cover_trial_id_and_extras() {
        let summary = known_aliases(config_for(DataType::TrialSummary));
        assert!(summary.contains("trial id"));
        let soil = known_aliases(config_for(DataType::SoilChemistry));
        assert!(soil.contains("paddock"));
        assert!(soil.contains("lab no"));
        assert!(!soil.contains("ph"));
    }
}
