// File I/O operations

pub mod csv;
pub mod xlsx;

use std::path::PathBuf;

use bookreg_core::Field;
use chrono::NaiveDate;

/// Header of the tenth export column.
pub const SUBMITTED_AT_LABEL: &str = "제출일시";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("xlsx: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("csv: {0}")]
    Csv(#[from] ::csv::Error),
}

/// Column headers shared by every export format: the field labels in
/// canonical order, then the submission time.
pub fn header_row() -> Vec<&'static str> {
    Field::ALL
        .iter()
        .map(|f| f.label())
        .chain(std::iter::once(SUBMITTED_AT_LABEL))
        .collect()
}

/// `book_registrations_<YYYY-MM-DD>.<ext>`
pub fn default_file_name(date: NaiveDate, ext: &str) -> String {
    format!("book_registrations_{}.{}", date.format("%Y-%m-%d"), ext)
}
