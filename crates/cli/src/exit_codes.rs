//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3       | Universal        | Local file I/O                           |
//! | 10-19   | form             | Local validation of the form             |
//! | 20-29   | sheets           | Token exchange and sheet calls           |
//! | 30-39   | config           | Configuration and credentials            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant mapping function below

use bookreg_config::ConfigError;
use bookreg_core::SubmitError;
use bookreg_io::ExportError;
use bookreg_sheets::SheetsError;

// =============================================================================
// Universal (0-3)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown field key.
pub const EXIT_USAGE: u8 = 2;

/// Reading input or writing an export file failed.
pub const EXIT_IO: u8 = 3;

// =============================================================================
// Form (10-19)
// =============================================================================

/// No row carries any content; nothing was sent.
pub const EXIT_NOTHING_TO_SUBMIT: u8 = 10;

// =============================================================================
// Sheets (20-29)
// =============================================================================

/// Access token could not be obtained (bad key, rejected assertion).
pub const EXIT_AUTH: u8 = 20;

/// Append call failed. Rows were not saved.
pub const EXIT_SAVE: u8 = 21;

/// Read call failed.
pub const EXIT_LOAD: u8 = 22;

// =============================================================================
// Config (30-39)
// =============================================================================

/// Config file, key file or environment is unreadable, invalid or incomplete.
pub const EXIT_CONFIG: u8 = 30;

// =============================================================================
// Error mapping
// =============================================================================

pub fn sheets_exit_code(err: &SheetsError) -> u8 {
    match err {
        SheetsError::Auth(_) => EXIT_AUTH,
        SheetsError::Save(_) => EXIT_SAVE,
        SheetsError::Load(_) => EXIT_LOAD,
    }
}

pub fn config_exit_code(_err: &ConfigError) -> u8 {
    EXIT_CONFIG
}

pub fn export_exit_code(err: &ExportError) -> u8 {
    match err {
        ExportError::Io { .. } => EXIT_IO,
        ExportError::Xlsx(_) | ExportError::Csv(_) => EXIT_ERROR,
    }
}

pub fn submit_exit_code(err: &SubmitError<SheetsError>) -> u8 {
    match err {
        SubmitError::NothingToSubmit => EXIT_NOTHING_TO_SUBMIT,
        SubmitError::Busy => EXIT_ERROR,
        SubmitError::Remote(e) => sheets_exit_code(e),
    }
}
