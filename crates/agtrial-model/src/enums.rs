//! Type-safe enumerations for ingestion metadata.
//!
//! Each enum that is persisted as text exposes `as_str` and a `FromStr`
//! implementation so the stored form and the parsed form never drift apart.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A registered kind of lab/trial file.
///
/// Adding a data type means adding a variant here and a matching arm in the
/// column map registry; the compiler enforces the second step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Trial summary sheet: names the trial and defines its treatments.
    TrialSummary,
    /// Soil laboratory analysis, one column per analyte.
    SoilChemistry,
    /// Plant tissue laboratory analysis, one column per analyte.
    TissueChemistry,
    /// Plot-level field assessments (yield, counts, heights).
    PlotData,
}

impl DataType {
    /// Every registered data type, in display order.
    pub const ALL: [DataType; 4] = [
        DataType::TrialSummary,
        DataType::SoilChemistry,
        DataType::TissueChemistry,
        DataType::PlotData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::TrialSummary => "trial_summary",
            DataType::SoilChemistry => "soil_chemistry",
            DataType::TissueChemistry => "tissue_chemistry",
            DataType::PlotData => "plot_data",
        }
    }

    /// Human-readable label for summaries.
    pub fn label(&self) -> &'static str {
        match self {
            DataType::TrialSummary => "Trial summary",
            DataType::SoilChemistry => "Soil chemistry",
            DataType::TissueChemistry => "Tissue chemistry",
            DataType::PlotData => "Plot data",
        }
    }

    /// True for the data type that establishes trial identity for a batch.
    pub fn establishes_trial(&self) -> bool {
        matches!(self, DataType::TrialSummary)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        DataType::ALL
            .into_iter()
            .find(|data_type| data_type.as_str() == normalized)
            .ok_or_else(|| ModelError::UnknownDataType(s.to_string()))
    }
}

/// Classification tag supplied for an incoming file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data_type", rename_all = "snake_case")]
pub enum FileClass {
    /// A loadable data file (including the trial summary).
    Data(DataType),
    /// A photo; not handled by the ingestion pipeline.
    Photo,
    /// The classifier could not recognise the file.
    Unknown,
}

impl FileClass {
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            FileClass::Data(data_type) => Some(*data_type),
            FileClass::Photo | FileClass::Unknown => None,
        }
    }

    pub fn is_trial_summary(&self) -> bool {
        self.data_type().is_some_and(|t| t.establishes_trial())
    }
}

/// How a data type's value columns become output rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotMode {
    /// One output row per source row; every value column is a named field.
    Direct,
    /// One output row per numeric measurement column per source row.
    WideToLong,
}

/// Declared type of a canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Number,
    Date,
}

/// Structural format of uploaded bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Delimited text (CSV, TSV, semicolon-separated).
    Delimited,
    /// Spreadsheet workbook (xlsx, xls, xlsb, ods).
    Spreadsheet,
}

/// Lifecycle status of a staged upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    /// Unmapped columns remain; load not yet attempted.
    Pending,
    /// Fully resolved and eligible to load.
    Mapped,
    /// Load attempted and failed.
    Error,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Pending => "pending",
            UploadStatus::Mapped => "mapped",
            UploadStatus::Error => "error",
        }
    }

    /// Status assigned when an upload is first staged.
    pub fn at_staging(mode: PivotMode, unmapped_columns: &[String]) -> Self {
        if mode == PivotMode::Direct && !unmapped_columns.is_empty() {
            UploadStatus::Pending
        } else {
            UploadStatus::Mapped
        }
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(UploadStatus::Pending),
            "mapped" => Ok(UploadStatus::Mapped),
            "error" => Ok(UploadStatus::Error),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_parses_loose_spellings() {
        assert_eq!(
            "Soil-Chemistry".parse::<DataType>().unwrap(),
            DataType::SoilChemistry
        );
        assert_eq!(
            "trial summary".parse::<DataType>().unwrap(),
            DataType::TrialSummary
        );
        assert!("yield".parse::<DataType>().is_err());
    }

    #[test]
    fn staging_status_depends_on_mode() {
        let unmapped = vec!["Colour".to_string()];
        assert_eq!(
            UploadStatus::at_staging(PivotMode::Direct, &unmapped),
            UploadStatus::Pending
        );
        assert_eq!(
            UploadStatus::at_staging(PivotMode::WideToLong, &unmapped),
            UploadStatus::Mapped
        );
        assert_eq!(
            UploadStatus::at_staging(PivotMode::Direct, &[]),
            UploadStatus::Mapped
        );
    }

    #[test]
    fn file_class_serializes_with_kind_tag() {
        let json = serde_json::to_string(&FileClass::Data(DataType::PlotData)).unwrap();
        assert_eq!(json, r#"{"kind":"data","data_type":"plot_data"}"#);
        let photo = serde_json::to_string(&FileClass::Photo).unwrap();
        assert_eq!(photo, r#"{"kind":"photo"}"#);
    }
}
