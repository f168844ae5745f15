// Excel export of submissions

use std::path::Path;

use bookreg_core::Submission;
use rust_xlsxwriter::{Format, FormatBorder, Workbook as XlsxWorkbook};

use crate::{header_row, ExportError};

pub const SHEET_NAME: &str = "도서 등록";

/// Column widths in Excel character units, one per export column.
const COLUMN_WIDTHS: [f64; 10] = [10.0, 32.0, 16.0, 16.0, 16.0, 10.0, 14.0, 14.0, 12.0, 24.0];

/// Build the workbook in memory.
fn build_workbook(rows: &[Submission]) -> Result<XlsxWorkbook, ExportError> {
    let mut workbook = XlsxWorkbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_border_bottom(FormatBorder::Thin);

    let worksheet = workbook.add_worksheet().set_name(SHEET_NAME)?;

    for (col, label) in header_row().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *label, &header_format)?;
    }
    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, value) in row.record.values().iter().enumerate() {
            worksheet.write_string(r, col as u16, *value)?;
        }
        worksheet.write_string(r, 9, &row.submitted_at)?;
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofilter(0, 0, rows.len() as u32, 9)?;

    Ok(workbook)
}

/// Write `rows` to an .xlsx file at `path`. Returns the number of data rows.
pub fn export(rows: &[Submission], path: &Path) -> Result<usize, ExportError> {
    let mut workbook = build_workbook(rows)?;
    workbook.save(path)?;
    log::info!("wrote {} row(s) to {}", rows.len(), path.display());
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_auto, Reader};
    use tempfile::tempdir;

    fn rows() -> Vec<Submission> {
        vec![
            Submission::from_values(&["1", "채식주의자", "한강", "창비", "9788936434120", "12000", "2007-10-30", "", "2024-01-15", "2024. 1. 15. 오후 3:04:05"]),
            Submission::from_values(&["2", "소년이 온다"]),
        ]
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(crate::default_file_name(
            chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            "xlsx",
        ));

        assert_eq!(export(&rows(), &path).unwrap(), 2);
        assert!(path.exists());

        let mut wb = open_workbook_auto(&path).unwrap();
        assert_eq!(wb.sheet_names(), vec![SHEET_NAME.to_string()]);
        let range = wb.worksheet_range(SHEET_NAME).unwrap();

        let cell = |r: u32, c: u32| {
            range
                .get_value((r, c))
                .map(|d| d.to_string())
                .unwrap_or_default()
        };
        assert_eq!(cell(0, 0), "도서 ID");
        assert_eq!(cell(0, 9), "제출일시");
        assert_eq!(cell(1, 1), "채식주의자");
        assert_eq!(cell(1, 5), "12000");
        assert_eq!(cell(1, 9), "2024. 1. 15. 오후 3:04:05");
        assert_eq!(cell(2, 1), "소년이 온다");
        assert_eq!(cell(2, 9), "");
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        assert_eq!(export(&[], &path).unwrap(), 0);

        let mut wb = open_workbook_auto(&path).unwrap();
        let range = wb.worksheet_range(SHEET_NAME).unwrap();
        assert_eq!(range.height(), 1);
        assert_eq!(range.width(), 10);
    }

    #[test]
    fn test_unwritable_path_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.xlsx");
        assert!(export(&rows(), &path).is_err());
    }
}
