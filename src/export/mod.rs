//! Export stage
//!
//! Serializes the sorted record set into one of the supported tabular
//! formats and writes it to the configured path. Formatting is pure
//! string-building; only the final write touches the filesystem.

mod delimited;
mod json;
mod sheet;
mod xml;

pub use delimited::{format_csv, format_tsv};
pub use json::format_json;
pub use sheet::format_sheet;
pub use xml::format_xml;

use crate::store::PhraseRecord;
use serde::Deserialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors that can occur during export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to serialize records: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Column order shared by every tabular format
pub const FIELDS: [&str; 9] = [
    "lesson_title",
    "lesson_order",
    "slide_index",
    "pinyin",
    "chinese",
    "translation",
    "notes",
    "audio_fast",
    "audio_slow",
];

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    Csv,
    Tsv,
    Json,
    Xml,
    Sheet,
}

impl ExportFormat {
    /// Conventional file extension for the format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
            ExportFormat::Sheet => "xls",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" => Ok(ExportFormat::Tsv),
            "json" => Ok(ExportFormat::Json),
            "xml" => Ok(ExportFormat::Xml),
            "sheet" => Ok(ExportFormat::Sheet),
            other => Err(format!(
                "Unknown format '{}' (expected csv, tsv, json, xml, or sheet)",
                other
            )),
        }
    }
}

/// Formats the record set in the given format
pub fn format_records(records: &[PhraseRecord], format: ExportFormat) -> ExportResult<String> {
    match format {
        ExportFormat::Csv => Ok(format_csv(records)),
        ExportFormat::Tsv => Ok(format_tsv(records)),
        ExportFormat::Json => format_json(records),
        ExportFormat::Xml => Ok(format_xml(records)),
        ExportFormat::Sheet => Ok(format_sheet(records)),
    }
}

/// Serializes the records and writes them to `path`
pub fn write_records(
    records: &[PhraseRecord],
    format: ExportFormat,
    path: &Path,
) -> ExportResult<()> {
    let serialized = format_records(records, format)?;

    let mut file = File::create(path)?;
    file.write_all(serialized.as_bytes())?;

    info!(
        "Exported {} records to {} ({:?})",
        records.len(),
        path.display(),
        format
    );
    Ok(())
}

/// The nine column values of one record, in [`FIELDS`] order
pub(crate) fn field_values(record: &PhraseRecord) -> [String; 9] {
    [
        record.lesson_title.clone(),
        record.lesson_order.to_string(),
        record.slide_index.to_string(),
        record.pinyin.clone(),
        record.chinese.clone(),
        record.translation.clone(),
        record.notes.clone(),
        record.audio_fast.clone(),
        record.audio_slow.clone(),
    ]
}
