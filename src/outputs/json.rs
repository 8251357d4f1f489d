//! JSON output.
//!
//! Records are written as a pretty-printed array whose objects use the same
//! keys as the CSV header:
//!
//! ```text
//! [
//!   {
//!     "Title": "NASA rocket launch",
//!     "Date": "2024-05-06T00:00:00+00:00",
//!     ...
//!   }
//! ]
//! ```

use super::{ExportError, ExportRow};
use crate::models::SearchResultRecord;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Serialize `records` to `path`, replacing any existing file.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub async fn write_records(
    records: &[SearchResultRecord],
    path: &Path,
) -> Result<(), ExportError> {
    let rows: Vec<ExportRow<'_>> = records.iter().map(ExportRow::from).collect();
    let json = serde_json::to_string_pretty(&rows)?;
    fs::write(path, json).await?;
    info!("Results saved to JSON");
    Ok(())
}
