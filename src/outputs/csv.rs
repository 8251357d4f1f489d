//! CSV output.

use super::{COLUMNS, ExportError, ExportRow};
use crate::models::SearchResultRecord;
use csv::WriterBuilder;
use std::path::Path;
use tracing::{info, instrument};

/// Write a header row and one row per record to `path`.
///
/// The header is written even when there are no records.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub fn write_records(records: &[SearchResultRecord], path: &Path) -> Result<(), ExportError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(COLUMNS)?;
    for record in records {
        writer.serialize(ExportRow::from(record))?;
    }
    writer.flush()?;
    info!("Results saved to CSV");
    Ok(())
}
