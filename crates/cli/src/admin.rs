//! Admin commands: read the sheet back, print it or write it to a file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bookreg_core::Submission;
use bookreg_sheets::SheetsClient;
use clap::ValueEnum;

use crate::util;
use crate::{load_config, CliError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Tsv,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
        }
    }

    /// Explicit format wins, then the `--out` extension, then xlsx.
    pub fn resolve(explicit: Option<Self>, out: Option<&Path>) -> Self {
        if let Some(format) = explicit {
            return format;
        }
        let ext = out
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => ExportFormat::Csv,
            Some("tsv") | Some("txt") => ExportFormat::Tsv,
            _ => ExportFormat::Xlsx,
        }
    }
}

fn fetch(config: Option<&Path>) -> Result<Vec<Submission>, CliError> {
    let config = load_config(config)?;
    let client = SheetsClient::new(config.account, config.sheet);
    client.read_submissions().map_err(CliError::sheets)
}

/// Ten display cells per submission: the nine fields and the timestamp.
fn table_rows(rows: &[Submission]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|s| {
            let mut cells: Vec<String> = s.record.values().iter().map(|v| v.to_string()).collect();
            cells.push(s.submitted_at.clone());
            cells
        })
        .collect()
}

pub fn cmd_list(config: Option<&Path>, json: bool) -> Result<(), CliError> {
    let rows = fetch(config)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let text = serde_json::to_string_pretty(&rows)
            .map_err(|e| CliError::io(format!("cannot encode rows: {}", e)))?;
        writeln!(out, "{}", text).map_err(|e| CliError::io(e.to_string()))?;
        return Ok(());
    }

    if rows.is_empty() {
        eprintln!("(no submitted rows)");
        return Ok(());
    }
    util::write_table(&mut out, &bookreg_io::header_row(), &table_rows(&rows))
        .map_err(|e| CliError::io(e.to_string()))?;
    eprintln!("{} row(s)", rows.len());
    Ok(())
}

pub fn cmd_export(config: Option<&Path>, out: Option<PathBuf>, format: Option<ExportFormat>) -> Result<(), CliError> {
    let format = ExportFormat::resolve(format, out.as_deref());
    let to_stdout = out.as_deref() == Some(Path::new("-"));
    if to_stdout && format == ExportFormat::Xlsx {
        return Err(CliError::args("xlsx output cannot be written to stdout")
            .with_hint("use --format csv with --out -, or give a file path"));
    }

    let rows = fetch(config)?;

    if to_stdout {
        let delimiter = if format == ExportFormat::Tsv { b'\t' } else { b',' };
        let stdout = io::stdout();
        bookreg_io::csv::write_submissions(&rows, stdout.lock(), delimiter).map_err(CliError::export)?;
        return Ok(());
    }

    let path = out.unwrap_or_else(|| {
        PathBuf::from(bookreg_io::default_file_name(
            chrono::Local::now().date_naive(),
            format.extension(),
        ))
    });
    let written = match format {
        ExportFormat::Xlsx => bookreg_io::xlsx::export(&rows, &path),
        ExportFormat::Csv => bookreg_io::csv::export(&rows, &path),
        ExportFormat::Tsv => bookreg_io::csv::export_tsv(&rows, &path),
    }
    .map_err(CliError::export)?;

    println!("wrote {} row(s) to {}", written, path.display());
    Ok(())
}
