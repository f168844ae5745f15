// Configuration loading
//
// One TOML file (`~/.config/bookreg/config.toml`), an optional Google
// service-account key file, and `BOOKREG_*` environment overrides are merged
// into an `AppConfig` once at start-up. Nothing below reads the environment
// on its own; callers pass a lookup into `ConfigFile::apply_env`.

pub mod account;
pub mod error;
pub mod settings;

pub use account::{GoogleKeyFile, ServiceAccountConfig};
pub use error::ConfigError;
pub use settings::{AppConfig, ConfigFile, SheetConfig};

/// Default OAuth scope: read/write access to spreadsheets.
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
/// Default token endpoint (the assertion audience).
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
/// Default sheets API host.
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_APPEND_RANGE: &str = "Sheet1!A:J";
/// Row 1 of the sheet holds column headers.
pub const DEFAULT_READ_RANGE: &str = "Sheet1!A2:J";

/// Load `.env` from the working directory, if there is one.
///
/// Variables already set in the process environment win.
pub fn load_env_file() {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("ignoring unreadable .env: {}", e),
    }
}
