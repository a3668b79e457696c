use agtrial_model::{
    CanonicalRow, ColumnMap, DataType, FieldValue, FileStatus, LoadStatus, NewUpload, RawRow,
    UploadId, UploadStatus,
};
use agtrial_store::{
    AtomicLoader, HistoryEntry, LoadRequest, RecordSink, SqliteStore, StagingStore, UploadLog,
};
use tempfile::TempDir;

fn soil_row(sample: &str, metric: &str, value: f64) -> CanonicalRow {
    let mut source = RawRow::new();
    source.insert("sample_no".to_string(), sample.into());
    let mut row = CanonicalRow::new(source);
    row.set("sample_no", FieldValue::from(sample));
    row.set("metric", FieldValue::from(metric));
    row.set("value", FieldValue::Number(value));
    row.set("unit", FieldValue::from(""));
    row
}

fn stage(store: &SqliteStore, trial: &str) -> UploadId {
    store
        .stage(&NewUpload {
            trial_id: trial.to_string(),
            filename: "soil.csv".to_string(),
            data_type: DataType::SoilChemistry,
            raw_rows: Vec::new(),
            headers: vec!["sample_no".to_string()],
            column_map: ColumnMap::new(),
            unmapped_columns: Vec::new(),
            defaults: Default::default(),
            content_sha256: "00".to_string(),
        })
        .expect("stage")
}

fn request<'a>(trial: &'a str, id: UploadId, rows: Vec<CanonicalRow>) -> LoadRequest<'a> {
    LoadRequest {
        data_type: DataType::SoilChemistry,
        trial_id: trial,
        filename: "soil.csv",
        rows,
        raw_upload_id: id,
    }
}

#[test]
fn repeated_load_is_idempotent() {
    let dir = TempDir::new().expect("temp dir");
    let store = SqliteStore::open(dir.path().join("trials.db")).expect("open");
    let id = stage(&store, "T1");
    let loader = AtomicLoader::new(&store, &store);

    let rows = vec![soil_row("S1", "pH", 6.8), soil_row("S1", "EC", 0.2)];
    let first = loader.load(request("T1", id, rows.clone()));
    let second = loader.load(request("T1", id, rows));

    assert_eq!(first.status, LoadStatus::Loaded);
    assert_eq!(second.records_written, 2);
    assert_eq!(store.count_records("soil_chemistry", "T1").expect("count"), 2);
}

#[test]
fn batch_duplicates_collapse_before_upsert() {
    let store = SqliteStore::in_memory().expect("open");
    let id = stage(&store, "T1");
    let loader = AtomicLoader::new(&store, &store);

    let outcome = loader.load(request(
        "T1",
        id,
        vec![soil_row("S1", "pH", 6.8), soil_row("S1", "pH", 7.2)],
    ));
    assert!(outcome.is_loaded());
    assert_eq!(outcome.records_written, 1);
    assert_eq!(store.count_records("soil_chemistry", "T1").expect("count"), 1);
}

#[test]
fn same_key_in_other_trial_is_distinct() {
    let store = SqliteStore::in_memory().expect("open");
    let loader = AtomicLoader::new(&store, &store);
    let a = stage(&store, "T1");
    let b = stage(&store, "T2");
    loader.load(request("T1", a, vec![soil_row("S1", "pH", 6.8)]));
    loader.load(request("T2", b, vec![soil_row("S1", "pH", 6.8)]));
    assert_eq!(store.count_records("soil_chemistry", "T1").expect("count"), 1);
    assert_eq!(store.count_records("soil_chemistry", "T2").expect("count"), 1);
}

#[test]
fn upsert_preserves_destination_only_columns() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("trials.db");
    let store = SqliteStore::open(&path).expect("open");
    let id = stage(&store, "T1");
    let loader = AtomicLoader::new(&store, &store);
    loader.load(request("T1", id, vec![soil_row("S1", "pH", 6.8)]));

    let conn = rusqlite::Connection::open(&path).expect("second connection");
    conn.execute("UPDATE soil_chemistry SET notes = 'resampled'", [])
        .expect("annotate");

    loader.load(request("T1", id, vec![soil_row("S1", "pH", 7.0)]));

    let (notes, fields): (String, String) = conn
        .query_row("SELECT notes, fields FROM soil_chemistry", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .expect("query");
    assert_eq!(notes, "resampled");
    assert!(fields.contains("7.0") || fields.contains(":7"));
}

#[test]
fn coverage_set_only_after_successful_load() {
    let store = SqliteStore::in_memory().expect("open");
    assert!(store.coverage("T1").expect("coverage").is_empty());

    let id = stage(&store, "T1");
    AtomicLoader::new(&store, &store).load(request("T1", id, vec![soil_row("S1", "pH", 6.8)]));

    let coverage = store.coverage("T1").expect("coverage");
    assert_eq!(coverage.len(), 1);
    assert_eq!(coverage[0].file_type, "soil_chemistry");
    assert!(coverage[0].has_data);
}

#[test]
fn failed_load_marks_upload_and_applies_nothing() {
    let store = SqliteStore::in_memory().expect("open");
    let staged = stage(&store, "T1");
    let loader = AtomicLoader::new(&store, &store);

    // The foreign key rejects a batch bound to an upload that was never staged.
    let missing = UploadId::new(staged.get() + 100);
    let outcome = loader.load(request(
        "T1",
        missing,
        vec![soil_row("S1", "pH", 6.8), soil_row("S2", "pH", 7.1)],
    ));
    assert_eq!(outcome.status, LoadStatus::Failed);
    assert!(outcome.detail.unwrap_or_default().contains("soil_chemistry"));
    assert_eq!(store.count_records("soil_chemistry", "T1").expect("count"), 0);
    assert!(store.coverage("T1").expect("coverage").is_empty());
}

#[test]
fn mark_error_is_visible_on_fetch() {
    let store = SqliteStore::in_memory().expect("open");
    let id = stage(&store, "T1");
    store.mark_error(id, "constraint failed").expect("mark");
    let upload = store.fetch(id).expect("fetch");
    assert_eq!(upload.status, UploadStatus::Error);
    assert_eq!(upload.error_detail.as_deref(), Some("constraint failed"));
}

#[test]
fn history_records_are_written() {
    let store = SqliteStore::in_memory().expect("open");
    store
        .record(&HistoryEntry {
            trial_id: None,
            filename: "photo.jpg".to_string(),
            file_type: None,
            status: FileStatus::Error,
            record_count: None,
            detail: Some("photos are not ingested".to_string()),
            content_sha256: None,
        })
        .expect("record");
}
