// CSV/TSV export of submissions, and text input for batch pastes

use std::io::{Read, Write};
use std::path::Path;

use bookreg_core::Submission;

use crate::{header_row, ExportError};

/// Write `rows` with a header line to `writer`.
pub fn write_submissions<W: Write>(rows: &[Submission], writer: W, delimiter: u8) -> Result<usize, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    writer.write_record(header_row())?;
    for row in rows {
        let mut record: Vec<&str> = row.record.values().to_vec();
        record.push(&row.submitted_at);
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|e| ExportError::Csv(e.into()))?;
    Ok(rows.len())
}

pub fn export(rows: &[Submission], path: &Path) -> Result<usize, ExportError> {
    export_with_delimiter(rows, path, b',')
}

pub fn export_tsv(rows: &[Submission], path: &Path) -> Result<usize, ExportError> {
    export_with_delimiter(rows, path, b'\t')
}

fn export_with_delimiter(rows: &[Submission], path: &Path, delimiter: u8) -> Result<usize, ExportError> {
    let file = std::fs::File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let written = write_submissions(rows, file, delimiter)?;
    log::info!("wrote {} row(s) to {}", written, path.display());
    Ok(written)
}

/// Read a text file and convert to UTF-8 if needed.
///
/// Handles a UTF-8 byte-order mark and falls back to EUC-KR (code page 949),
/// which is what Korean Excel writes for "Text (Tab delimited)".
pub fn read_file_as_utf8(path: &Path) -> Result<String, ExportError> {
    let mut bytes = Vec::new();
    std::fs::File::open(path)
        .and_then(|mut f| f.read_to_end(&mut bytes))
        .map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(decode_text(bytes))
}

/// Decode raw clipboard or file bytes. See [`read_file_as_utf8`].
pub fn decode_text(bytes: Vec<u8>) -> String {
    if let Some(rest) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        return String::from_utf8_lossy(rest).into_owned();
    }
    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, had_errors) = encoding_rs::EUC_KR.decode(&bytes);
            if had_errors {
                log::warn!("input is neither UTF-8 nor EUC-KR, some characters were replaced");
            }
            decoded.into_owned()
        }
    }
}
