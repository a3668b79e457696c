//! Filename-based classification.
//!
//! Used when the caller did not supply a classification tag. Keywords are
//! matched against the lower-cased file stem; the first matching rule wins.

use std::path::Path;

use agtrial_model::{DataType, FileClass, SourceFormat};

const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "gif", "webp", "tif", "tiff"];
const DELIMITED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

const RULES: &[(&[&str], DataType)] = &[
    (&["summary", "protocol", "treatment"], DataType::TrialSummary),
    (&["tissue", "leaf", "petiole", "plant analysis"], DataType::TissueChemistry),
    (&["soil"], DataType::SoilChemistry),
    (&["plot", "yield", "harvest", "assessment"], DataType::PlotData),
];

fn extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

/// Structural format implied by the file extension.
pub fn source_format(filename: &str) -> Option<SourceFormat> {
    let ext = extension(filename);
    if DELIMITED_EXTENSIONS.contains(&ext.as_str()) {
        Some(SourceFormat::Delimited)
    } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        Some(SourceFormat::Spreadsheet)
    } else {
        None
    }
}

/// Classifies a file by name.
pub fn classify_filename(filename: &str) -> FileClass {
    if PHOTO_EXTENSIONS.contains(&extension(filename).as_str()) {
        return FileClass::Photo;
    }
    if source_format(filename).is_none() {
        return FileClass::Unknown;
    }

    let stem = Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_lowercase()
        .replace(['_', '-', '.'], " ");

    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| stem.contains(k)))
        .map_or(FileClass::Unknown, |(_, data_type)| FileClass::Data(*data_type))
}
