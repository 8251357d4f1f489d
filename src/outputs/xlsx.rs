//! Excel workbook output.

use super::{COLUMNS, ExportError, ExportRow};
use crate::models::SearchResultRecord;
use rust_xlsxwriter::{Format as CellFormat, Workbook};
use std::path::Path;
use tracing::{info, instrument};

/// Name of the single worksheet in the workbook.
pub const SHEET_NAME: &str = "Results";

/// Write a bold header row and one row per record to a workbook at `path`.
///
/// Counts are stored as numbers and the money flag as a boolean. Empty text
/// fields are left as blank cells.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = records.len()))]
pub fn write_records(records: &[SearchResultRecord], path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let header = CellFormat::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    for (col, name) in (0u16..).zip(COLUMNS) {
        sheet.write_string_with_format(0, col, name, &header)?;
    }

    for (row, record) in (1u32..).zip(records) {
        let export = ExportRow::from(record);
        let text = [
            (0, export.title),
            (1, export.date.as_str()),
            (2, export.description),
            (3, export.picture_filename),
            (6, export.link),
        ];
        for (col, value) in text {
            if !value.is_empty() {
                sheet.write_string(row, col, value)?;
            }
        }
        sheet.write_number(row, 4, export.phrase_count as f64)?;
        sheet.write_boolean(row, 5, export.money_present)?;
    }

    workbook.save(path)?;
    info!("Results saved to Excel");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx, open_workbook};
    use chrono::{TimeZone, Utc};

    fn read_rows(path: &Path) -> Vec<Vec<Data>> {
        let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        range.rows().map(|row| row.to_vec()).collect()
    }

    #[test]
    fn test_header_and_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("search_results.xlsx");
        let record = SearchResultRecord {
            title: "NASA rocket".to_string(),
            published_at: Some(Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap()),
            description: "Costs $5".to_string(),
            image_filename: "rocket_20240506000000000000.jpg".to_string(),
            phrase_match_count: 2,
            contains_money: true,
            source_link: "https://www.latimes.com/story".to_string(),
        };

        write_records(&[record, SearchResultRecord::default()], &path).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 3);
        let header: Vec<Data> = COLUMNS.iter().map(|c| Data::String(c.to_string())).collect();
        assert_eq!(rows[0], header);
        assert_eq!(
            rows[1],
            vec![
                Data::String("NASA rocket".to_string()),
                Data::String("2024-05-06T00:00:00+00:00".to_string()),
                Data::String("Costs $5".to_string()),
                Data::String("rocket_20240506000000000000.jpg".to_string()),
                Data::Float(2.0),
                Data::Bool(true),
                Data::String("https://www.latimes.com/story".to_string()),
            ]
        );
        assert_eq!(rows[2][0], Data::Empty);
        assert_eq!(rows[2][4], Data::Float(0.0));
        assert_eq!(rows[2][5], Data::Bool(false));
    }

    #[test]
    fn test_empty_results_still_have_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.xlsx");

        write_records(&[], &path).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], Data::String("Title".to_string()));
        assert_eq!(rows[0][6], Data::String("Link".to_string()));
    }
}
