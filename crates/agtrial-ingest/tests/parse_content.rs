use std::fs;
use std::io::Write;

use agtrial_ingest::{
    IngestError, classify_filename, content_sha256, parse_content, sample_values_for,
    source_format,
};
use agtrial_model::{DataType, FileClass, SourceFormat, cell};
use tempfile::NamedTempFile;

#[test]
fn parses_soil_export_from_disk() {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(b"sample_no,pH (1:5),EC (dS/m)\r\nS1,6.8,0.2\r\nS2,7.1,\r\n")
        .expect("write");
    file.flush().expect("flush");

    let bytes = fs::read(file.path()).expect("read");
    let table = parse_content(&bytes, SourceFormat::Delimited).expect("parse");

    assert_eq!(table.headers, vec!["sample_no", "pH (1:5)", "EC (dS/m)"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(cell(&table.rows[0], "pH (1:5)"), "6.8");
    assert_eq!(cell(&table.rows[1], "EC (dS/m)"), "");
}

#[test]
fn raw_rows_keep_every_header() {
    let table = parse_content(b"Plot\tYield\tNotes\n1\t4.2\n", SourceFormat::Delimited)
        .expect("parse");
    let row = &table.rows[0];
    assert_eq!(row.len(), 3);
    assert_eq!(cell(row, "Notes"), "");
}

#[test]
fn header_only_file_is_a_parse_error() {
    let err = parse_content(b"Plot,Yield\n,\n", SourceFormat::Delimited).unwrap_err();
    assert!(matches!(err, IngestError::NoDataRows));
    assert_eq!(err.to_string(), "file has a header row but no data rows");
}

#[test]
fn duplicate_headers_are_rejected() {
    let err = parse_content(b"pH,pH\n1,2\n", SourceFormat::Delimited).unwrap_err();
    assert_eq!(
        err.to_string(),
        "duplicate column header 'pH' (columns 1 and 2)"
    );
}

#[test]
fn classifier_and_format_agree() {
    let name = "Soil_Chemistry_2024.csv";
    assert_eq!(
        classify_filename(name),
        FileClass::Data(DataType::SoilChemistry)
    );
    assert_eq!(source_format(name), Some(SourceFormat::Delimited));
}

#[test]
fn samples_follow_header_order() {
    let table = parse_content(b"A,B\nx,1\ny,1\n", SourceFormat::Delimited).expect("parse");
    let samples = sample_values_for(&table.rows, &table.headers, 5);
    assert_eq!(samples["A"], vec!["x", "y"]);
    assert_eq!(samples["B"], vec!["1"]);
}

#[test]
fn hash_is_stable_hex() {
    let digest = content_sha256(b"Plot,Yield\n1,4.2\n");
    assert_eq!(digest.len(), 64);
    assert_eq!(digest, content_sha256(b"Plot,Yield\n1,4.2\n"));
    assert_ne!(digest, content_sha256(b"Plot,Yield\n1,4.3\n"));
}
