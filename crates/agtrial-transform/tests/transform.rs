use std::collections::BTreeMap;

use agtrial_ingest::parse_content;
use agtrial_map::config_for;
use agtrial_model::{
    Binding, CanonicalRow, DataType, FieldValue, Overrides, RawRow, SourceFormat,
};
use agtrial_transform::{TransformError, TransformInput, TransformOutput, transform};

fn run(
    csv: &str,
    data_type: DataType,
    overrides: &Overrides,
    defaults: &BTreeMap<String, FieldValue>,
) -> Result<TransformOutput, TransformError> {
    let table = parse_content(csv.as_bytes(), SourceFormat::Delimited).expect("parse");
    transform(&TransformInput {
        rows: &table.rows,
        headers: &table.headers,
        config: config_for(data_type),
        overrides,
        extra_defaults: defaults,
    })
}

fn text<'a>(row: &'a CanonicalRow, field: &str) -> &'a str {
    row.text(field).unwrap_or_default()
}

#[test]
fn soil_example_pivots_to_three_rows() {
    let out = run(
        "sample_no,pH (1:5),EC (dS/m)\nS1,6.8,0.2\nS2,7.1,\n",
        DataType::SoilChemistry,
        &Overrides::new(),
        &BTreeMap::new(),
    )
    .expect("transform");

    let summary: Vec<(&str, &str, f64, &str)> = out
        .rows
        .iter()
        .map(|r| {
            (
                text(r, "sample_no"),
                text(r, "metric"),
                r.number("value").unwrap_or(f64::NAN),
                text(r, "unit"),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("S1", "pH", 6.8, "1:5"),
            ("S1", "EC", 0.2, "dS/m"),
            ("S2", "pH", 7.1, "1:5"),
        ]
    );
    assert!(out.unmapped_columns.is_empty());
}

#[test]
fn pivot_rows_keep_source_row_for_audit() {
    let out = run(
        "Sample No,Paddock,Ca (cmol/kg)\nS9,North,4.5\n",
        DataType::SoilChemistry,
        &Overrides::new(),
        &BTreeMap::new(),
    )
    .expect("transform");
    assert_eq!(out.rows.len(), 1);
    let source: &RawRow = &out.rows[0].source;
    assert_eq!(source.get("Paddock").and_then(|v| v.as_str()), Some("North"));
    assert!(out.rows[0].get("paddock").is_none());
}

#[test]
fn pivot_completeness_skips_text_and_identity() {
    let out = run(
        "Lab No,Date,Depth,Client,Zn (mg/kg),Comment,Cu (mg/kg)\n\
         L1,05/03/2024,0-10,Smith,1.2,ok,\n\
         L2,05/03/2024,10-30,Smith,,,0.8\n",
        DataType::SoilChemistry,
        &Overrides::new(),
        &BTreeMap::new(),
    )
    .expect("transform");
    let metrics: Vec<(&str, &str)> = out
        .rows
        .iter()
        .map(|r| (text(r, "sample_no"), text(r, "metric")))
        .collect();
    assert_eq!(metrics, vec![("L1", "Zn"), ("L2", "Cu")]);
    assert_eq!(text(&out.rows[0], "sample_date"), "2024-03-05");
    assert_eq!(text(&out.rows[1], "depth"), "10-30");
}

#[test]
fn metric_override_pivots_identity_header() {
    let mut overrides = Overrides::new();
    overrides.insert("Depth".to_string(), Binding::Metric);
    let out = run(
        "Sample No,Depth\nS1,15\n",
        DataType::SoilChemistry,
        &overrides,
        &BTreeMap::new(),
    )
    .expect("transform");
    assert_eq!(out.rows.len(), 1);
    assert_eq!(text(&out.rows[0], "metric"), "Depth");
    assert_eq!(out.rows[0].get("depth"), Some(&FieldValue::Null));
}

#[test]
fn skip_override_excludes_measurement() {
    let mut overrides = Overrides::new();
    overrides.insert("EC (dS/m)".to_string(), Binding::Skip);
    let out = run(
        "sample_no,pH (1:5),EC (dS/m)\nS1,6.8,0.2\n",
        DataType::SoilChemistry,
        &overrides,
        &BTreeMap::new(),
    )
    .expect("transform");
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.column_map.get("EC (dS/m)"), Some(&Binding::Skip));
}

#[test]
fn direct_mode_coerces_and_reports_unmapped() {
    let out = run(
        "Plot,Date,Yield,Rep,Colour\n101,05/03/2024,\"4,512.5\",x,green\n102,,3.9,2,\n",
        DataType::PlotData,
        &Overrides::new(),
        &BTreeMap::new(),
    )
    .expect("transform");
    assert_eq!(out.unmapped_columns, vec!["Colour"]);
    assert_eq!(out.rows.len(), 2);
    let first = &out.rows[0];
    assert_eq!(first.number("yield_t_ha"), Some(4512.5));
    assert_eq!(first.get("rep"), Some(&FieldValue::Null));
    assert_eq!(text(first, "assessment_date"), "2024-03-05");
    assert_eq!(out.rows[1].get("assessment_date"), Some(&FieldValue::Null));
    assert_eq!(text(first, "notes"), "");
}

#[test]
fn review_override_maps_unknown_column() {
    let mut overrides = Overrides::new();
    overrides.insert("Colour".to_string(), Binding::Field("notes".to_string()));
    let out = run(
        "Plot,Colour\n1,green\n2,yellow\n",
        DataType::PlotData,
        &overrides,
        &BTreeMap::new(),
    )
    .expect("transform");
    assert!(out.unmapped_columns.is_empty());
    assert_eq!(text(&out.rows[1], "notes"), "yellow");
}

#[test]
fn extra_defaults_fill_missing_fields() {
    let mut defaults = BTreeMap::new();
    defaults.insert("notes".to_string(), FieldValue::from("imported"));
    defaults.insert("season".to_string(), FieldValue::from("2024"));
    let out = run(
        "Plot,Notes\n1,\n2,lodged\n",
        DataType::PlotData,
        &Overrides::new(),
        &defaults,
    )
    .expect("transform");
    assert_eq!(text(&out.rows[0], "notes"), "imported");
    assert_eq!(text(&out.rows[1], "notes"), "lodged");
    assert_eq!(text(&out.rows[1], "season"), "2024");
}

#[test]
fn rows_without_identity_are_dropped() {
    let out = run(
        "Trt,Product\n1,Urea\n,orphan\n",
        DataType::TrialSummary,
        &Overrides::new(),
        &BTreeMap::new(),
    )
    .expect("transform");
    assert_eq!(out.rows.len(), 1);
}

#[test]
fn zero_surviving_rows_is_a_mapping_error() {
    let err = run(
        "Mystery,pH\nA,6.1\n",
        DataType::SoilChemistry,
        &Overrides::new(),
        &BTreeMap::new(),
    )
    .unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"no soil_chemistry rows could be produced from 1 input row(s): no column matched the identity field(s) sample_no, sample_date, block, depth"
    );
}

#[test]
fn all_text_measurements_is_a_mapping_error() {
    let err = run(
        "Sample No,Texture\nS1,loam\n",
        DataType::SoilChemistry,
        &Overrides::new(),
        &BTreeMap::new(),
    )
    .unwrap_err();
    assert!(matches!(err, TransformError::NoRows { input_rows: 1, .. }));
    assert!(err.to_string().ends_with("no numeric measurement values were found"));
}

#[test]
fn bad_override_surfaces_map_error() {
    let mut overrides = Overrides::new();
    overrides.insert("Nope".to_string(), Binding::Skip);
    let err = run(
        "Plot\n1\n",
        DataType::PlotData,
        &overrides,
        &BTreeMap::new(),
    )
    .unwrap_err();
    assert!(matches!(err, TransformError::Map(_)));
}
