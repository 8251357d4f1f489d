//! Export of the collected records.
//!
//! Every format carries the same seven columns, in this order:
//!
//! | Column | Source |
//! |--------|--------|
//! | Title | headline text |
//! | Date | RFC 3339 publication time, empty when unknown |
//! | Description | summary text |
//! | Picture Filename | downloaded thumbnail name, empty when none |
//! | Count of Search Phrases | phrase occurrences in title and description |
//! | Money Present | `true` / `false` |
//! | Link | story URL |
//!
//! # Submodules
//!
//! - [`csv`]: One header row plus one row per record
//! - [`json`]: A pretty-printed array of objects keyed by column name
//! - [`xlsx`]: An Excel workbook with a bold header row

use crate::models::SearchResultRecord;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

pub mod csv;
pub mod json;
pub mod xlsx;

/// Column headers, in output order.
pub const COLUMNS: [&str; 7] = [
    "Title",
    "Date",
    "Description",
    "Picture Filename",
    "Count of Search Phrases",
    "Money Present",
    "Link",
];

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    #[default]
    Csv,
    Json,
    Xlsx,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Csv(#[from] ::csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One output row. Field names are the column headers.
#[derive(Debug, Serialize)]
pub struct ExportRow<'a> {
    #[serde(rename = "Title")]
    pub title: &'a str,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Description")]
    pub description: &'a str,
    #[serde(rename = "Picture Filename")]
    pub picture_filename: &'a str,
    #[serde(rename = "Count of Search Phrases")]
    pub phrase_count: usize,
    #[serde(rename = "Money Present")]
    pub money_present: bool,
    #[serde(rename = "Link")]
    pub link: &'a str,
}

impl<'a> From<&'a SearchResultRecord> for ExportRow<'a> {
    fn from(record: &'a SearchResultRecord) -> Self {
        Self {
            title: &record.title,
            date: record
                .published_at
                .map(|date| date.to_rfc3339())
                .unwrap_or_default(),
            description: &record.description,
            picture_filename: &record.image_filename,
            phrase_count: record.phrase_match_count,
            money_present: record.contains_money,
            link: &record.source_link,
        }
    }
}

/// Write `records` to `path` in `format`, creating the parent directory if needed.
pub async fn write_records(
    records: &[SearchResultRecord],
    path: &Path,
    format: Format,
) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    match format {
        Format::Csv => csv::write_records(records, path),
        Format::Json => json::write_records(records, path).await,
        Format::Xlsx => xlsx::write_records(records, path),
    }
}
