//! Command-level tests against a temporary database and input folder.

use std::fs;
use std::path::{Path, PathBuf};

use agtrial_cli::commands::{
    IngestRequest, build_overrides, open_store, run_coverage, run_ingest, run_review_show,
    run_review_submit,
};
use agtrial_cli::config::AppConfig;
use agtrial_cli::summary::{batch_table, coverage_table, review_table, types_table};
use agtrial_model::{Binding, FieldValue, FileStatus};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write input");
    path
}

#[test]
fn ingest_then_review_then_coverage() {
    let dir = TempDir::new().expect("temp dir");
    let soil = write(
        dir.path(),
        "soil_results.csv",
        "sample_no,pH (1:5),EC (dS/m)\nS1,6.8,0.2\nS2,7.1,\n",
    );
    let plot = write(
        dir.path(),
        "plot_yield.csv",
        "Plot,Date,Yield,Colour\n101,05/03/2024,4.5,green\n",
    );
    let db = dir.path().join("trials.db");

    let batch = run_ingest(
        open_store(&db).expect("open"),
        IngestRequest {
            files: vec![soil, plot],
            trial_id: Some("T1".to_string()),
            ..IngestRequest::default()
        },
    )
    .expect("ingest");
    assert_eq!(batch.count(FileStatus::Success), 1);
    assert_eq!(batch.count(FileStatus::NeedsReview), 1);

    let rendered = batch_table(&batch).to_string();
    assert!(rendered.contains("soil_results.csv"));
    assert!(rendered.contains("needs_review"));

    let id = batch
        .get("plot_yield.csv")
        .and_then(|r| r.raw_upload_id)
        .expect("staged upload");
    let payload = run_review_show(open_store(&db).expect("open"), id.get()).expect("show");
    assert!(review_table(&payload).to_string().contains("unmapped"));

    let result = run_review_submit(
        open_store(&db).expect("open"),
        id.get(),
        &[("Colour".to_string(), "notes".to_string())],
        Default::default(),
    )
    .expect("submit");
    assert_eq!(result.status, FileStatus::Success);
    assert_eq!(result.record_count, Some(1));

    let store = open_store(&db).expect("open");
    let report = run_coverage(&store, "T1").expect("coverage");
    let counts: Vec<(&str, usize)> = report
        .counts
        .iter()
        .map(|(file_type, n)| (file_type.as_str(), *n))
        .collect();
    assert!(counts.contains(&("soil_chemistry", 3)));
    assert!(counts.contains(&("plot_data", 1)));
    assert!(counts.contains(&("trial_summary", 0)));
    assert_eq!(report.entries.len(), 2);
    assert!(coverage_table(&report.entries, &report.counts)
        .to_string()
        .contains("plot_data"));
}

#[test]
fn missing_input_file_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let err = run_ingest(
        open_store(&dir.path().join("trials.db")).expect("open"),
        IngestRequest {
            files: vec![dir.path().join("absent.csv")],
            ..IngestRequest::default()
        },
    )
    .expect_err("missing file");
    assert!(format!("{err:#}").contains("absent.csv"));
}

#[test]
fn review_of_unknown_upload_fails() {
    let dir = TempDir::new().expect("temp dir");
    let store = open_store(&dir.path().join("trials.db")).expect("open");
    let err = run_review_show(store, 404).expect_err("unknown upload");
    assert!(format!("{err:#}").contains("404"));
}

#[test]
fn overrides_parse_special_tokens() {
    let overrides = build_overrides(&[
        ("Depth".to_string(), "__metric__".to_string()),
        ("Comment".to_string(), "__skip__".to_string()),
        ("Colour".to_string(), "notes".to_string()),
    ])
    .expect("overrides");
    assert_eq!(overrides["Depth"], Binding::Metric);
    assert_eq!(overrides["Comment"], Binding::Skip);
    assert_eq!(overrides["Colour"], Binding::Field("notes".to_string()));

    assert!(build_overrides(&[("Colour".to_string(), " ".to_string())]).is_err());
}

#[test]
fn config_file_supplies_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "agtrial.toml",
        "database = \"lab.db\"\ntrial_id = \"T24-07\"\n\n[defaults]\ncrop = \"wheat\"\nrep = 1\n",
    );
    let config = AppConfig::load(&path).expect("load config");
    assert_eq!(config.database(None), PathBuf::from("lab.db"));
    assert_eq!(config.trial_id(None).as_deref(), Some("T24-07"));
    assert_eq!(config.defaults["crop"], FieldValue::from("wheat"));
    assert_eq!(config.defaults["rep"], FieldValue::Number(1.0));
}

#[test]
fn unknown_config_keys_are_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(dir.path(), "agtrial.toml", "databse = \"lab.db\"\n");
    let err = AppConfig::load(&path).expect_err("typo");
    assert!(format!("{err:#}").contains("agtrial.toml"));
}

#[test]
fn types_table_lists_every_data_type() {
    let rendered = types_table().to_string();
    for name in ["trial_summary", "soil_chemistry", "tissue_chemistry", "plot_data"] {
        assert!(rendered.contains(name), "missing {name}");
    }
    assert!(rendered.contains("wide-to-long"));
}
