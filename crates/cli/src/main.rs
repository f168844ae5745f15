// bookreg - book registration form backed by a Google Sheet

mod admin;
mod exit_codes;
mod tui;
mod util;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bookreg_config::{AppConfig, ConfigError, ConfigFile};
use bookreg_core::{paste, stamp, Action, Field, Form, SubmitError};
use bookreg_io::ExportError;
use bookreg_sheets::{SheetsClient, SheetsError};
use clap::{Parser, Subcommand};

use exit_codes::{
    config_exit_code, export_exit_code, sheets_exit_code, submit_exit_code, EXIT_ERROR, EXIT_IO,
    EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "bookreg")]
#[command(about = "Register books into a shared Google Sheet")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Config file (default: ~/.config/bookreg/config.toml)
    #[arg(long, global = true, env = "BOOKREG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive registration form
    #[command(after_help = "\
Keys:
  arrows / Tab      Move between cells
  type / Enter      Edit the current cell
  paste             Fan clipboard rows and columns out from the cursor
  Ctrl+N            Add a row
  Ctrl+D            Delete the current row
  Ctrl+S            Submit every filled row
  Ctrl+Q            Quit
  F1                Help

Logging is off while the form is open unless --log-file is given.")]
    Form {
        /// Append log output to this file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Paste tab-separated rows into a fresh form and submit them
    #[command(after_help = "\
Examples:
  bookreg submit books.tsv
  pbpaste | bookreg submit
  bookreg submit titles.txt --field bookName --dry-run

Each line is a row, tabs separate columns. Columns fan out from --field
in form order: bookId, bookName, author, publisher, isbn, price,
paperDate, ebookDate, requestDate. Blank lines are skipped.")]
    Submit {
        /// Input file (default: stdin). UTF-8 or EUC-KR.
        input: Option<PathBuf>,

        /// Field the first column lands in
        #[arg(long, default_value = "bookId")]
        field: String,

        /// Print the rows that would be sent and exit
        #[arg(long)]
        dry_run: bool,
    },

    /// Review submitted rows
    #[command(subcommand)]
    Admin(AdminCommands),

    /// Check configuration and credentials
    #[command(after_help = "\
Examples:
  bookreg doctor --init     Write a starter config file
  bookreg doctor            Load config and fetch an access token")]
    Doctor {
        /// Write a commented config template if none exists
        #[arg(long)]
        init: bool,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Print every submitted row
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download every submitted row into a spreadsheet file
    #[command(after_help = "\
Examples:
  bookreg admin export
  bookreg admin export --out books.csv
  bookreg admin export --format csv --out -
  bookreg admin export --out books.tsv")]
    Export {
        /// Output path (default: book_registrations_<date>.<ext>). '-' for stdout (csv/tsv only).
        #[arg(long)]
        out: Option<PathBuf>,

        /// File format (default: from --out extension, else xlsx)
        #[arg(long, value_enum)]
        format: Option<admin::ExportFormat>,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    bookreg_config::load_env_file();
    if let Err(err) = init_logging(&cli.command) {
        return report(err);
    }

    let config = cli.config.as_deref();
    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: bookreg <command> [options]");
            eprintln!("       bookreg --help for more information");
            Ok(())
        }
        Some(Commands::Form { log_file: _ }) => cmd_form(config),
        Some(Commands::Submit { input, field, dry_run }) => {
            cmd_submit(config, input.as_deref(), &field, dry_run)
        }
        Some(Commands::Admin(admin_cmd)) => match admin_cmd {
            AdminCommands::List { json } => admin::cmd_list(config, json),
            AdminCommands::Export { out, format } => admin::cmd_export(config, out, format),
        },
        Some(Commands::Doctor { init }) => cmd_doctor(config, init),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => report(err),
    }
}

fn report(CliError { code, message, hint }: CliError) -> ExitCode {
    if !message.is_empty() {
        eprintln!("error: {}", message);
    }
    if let Some(hint) = hint {
        eprintln!("hint:  {}", hint);
    }
    ExitCode::from(code)
}

/// `RUST_LOG` filtering (default `warn`) on stderr. The form owns the
/// terminal, so there it logs to `--log-file` or nowhere.
fn init_logging(command: &Option<Commands>) -> Result<(), CliError> {
    let env = env_logger::Env::default().default_filter_or("warn");
    match command {
        Some(Commands::Form { log_file: Some(path) }) => {
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| CliError::io(format!("cannot open log file {}: {}", path.display(), e)))?;
            env_logger::Builder::from_env(env)
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Some(Commands::Form { log_file: None }) => {
            env_logger::Builder::new()
                .filter_level(log::LevelFilter::Off)
                .init();
        }
        _ => env_logger::Builder::from_env(env).init(),
    }
    Ok(())
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::Missing { .. } => {
                Some("run `bookreg doctor --init` to write a starter config file".to_string())
            }
            ConfigError::Parse { .. } | ConfigError::Invalid { .. } => {
                Some("compare with the template written by `bookreg doctor --init`".to_string())
            }
            _ => None,
        };
        Self { code: config_exit_code(&err), message: err.to_string(), hint }
    }

    /// Create error from a sheets error with the stage's exit code.
    pub fn sheets(err: SheetsError) -> Self {
        let code = sheets_exit_code(&err);
        let hint = match &err {
            SheetsError::Auth(_) => {
                Some("check the service-account key and token URI (`bookreg doctor`)".to_string())
            }
            SheetsError::Save(bookreg_sheets::Failure::Http(403, _))
            | SheetsError::Load(bookreg_sheets::Failure::Http(403, _)) => {
                Some("share the spreadsheet with the service-account e-mail as an editor".to_string())
            }
            SheetsError::Save(bookreg_sheets::Failure::Http(404, _))
            | SheetsError::Load(bookreg_sheets::Failure::Http(404, _)) => {
                Some("check sheet.spreadsheet_id and the sheet ranges".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn submit(err: SubmitError<SheetsError>) -> Self {
        let code = submit_exit_code(&err);
        let message = err.to_string();
        match err {
            SubmitError::Remote(e) => Self::sheets(e),
            SubmitError::NothingToSubmit => Self {
                code,
                message,
                hint: Some("every row is empty; check --field and the input".to_string()),
            },
            SubmitError::Busy => Self { code, message, hint: None },
        }
    }

    pub fn export(err: ExportError) -> Self {
        Self { code: export_exit_code(&err), message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Load the config file and environment, resolved into a full config.
fn load_config(path: Option<&Path>) -> Result<AppConfig, CliError> {
    AppConfig::load(path).map_err(CliError::config)
}

// ============================================================================
// form
// ============================================================================

fn cmd_form(config: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config)?;
    let client = SheetsClient::new(config.account, config.sheet);
    let form = Form::new(config.form);
    log::info!("opening form with {} rows", form.grid().len());
    tui::run(form, client).map_err(|e| CliError { code: EXIT_ERROR, message: e, hint: None })
}

// ============================================================================
// submit
// ============================================================================

fn cmd_submit(config: Option<&Path>, input: Option<&Path>, field: &str, dry_run: bool) -> Result<(), CliError> {
    let field: Field = field.parse().map_err(|e: bookreg_core::field::UnknownField| CliError::args(e.to_string()))?;

    let text = match input {
        Some(path) if path != Path::new("-") => {
            bookreg_io::csv::read_file_as_utf8(path).map_err(CliError::export)?
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| CliError::io(format!("cannot read stdin: {}", e)))?;
            bookreg_io::csv::decode_text(buf)
        }
    };

    // Dry runs need form settings only, never credentials.
    let (file, base_dir) = ConfigFile::load_with_env(config).map_err(CliError::config)?;
    let settings = file.form_settings().map_err(CliError::config)?;

    let mut form = Form::new(settings);
    let anchor = form
        .grid()
        .row_at(0)
        .map(|r| r.id)
        .ok_or_else(|| CliError { code: EXIT_ERROR, message: "form has no rows".into(), hint: None })?;
    let text = paste::normalize_line_endings(&text);
    form.dispatch(Action::Paste { row: anchor, field, text });

    // Checked before credentials are resolved, so an empty paste never
    // reaches config errors or the network.
    let rows = form.pending();
    if rows.is_empty() {
        return Err(CliError::submit(SubmitError::NothingToSubmit));
    }

    if dry_run {
        let table: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.values().iter().map(|v| v.to_string()).collect())
            .collect();
        let headers: Vec<&str> = Field::ALL.iter().map(|f| f.label()).collect();
        let stdout = io::stdout();
        util::write_table(&mut stdout.lock(), &headers, &table)
            .map_err(|e| CliError::io(e.to_string()))?;
        eprintln!("{} row(s) would be submitted (dry run)", rows.len());
        return Ok(());
    }

    let config = file.resolve(&base_dir).map_err(CliError::config)?;
    let client = SheetsClient::new(config.account, config.sheet);
    let sent = form
        .submit(&client, &stamp::now())
        .map_err(CliError::submit)?;

    println!("submitted {} row(s)", sent);
    Ok(())
}

// ============================================================================
// doctor
// ============================================================================

fn cmd_doctor(config: Option<&Path>, init: bool) -> Result<(), CliError> {
    if init {
        let path = config
            .map(Path::to_path_buf)
            .unwrap_or_else(ConfigFile::default_path);
        let written = ConfigFile::write_template(&path).map_err(CliError::config)?;
        if written {
            println!("wrote {}", path.display());
        } else {
            println!("config already exists at {} (left unchanged)", path.display());
        }
        return Ok(());
    }

    let config = load_config(config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let _ = writeln!(out, "account:     {}", config.account.identity);
    let _ = writeln!(out, "token uri:   {}", config.account.audience);
    let _ = writeln!(out, "spreadsheet: {}", config.account.resource_id);
    let _ = writeln!(out, "append:      {}", config.sheet.append_range);
    let _ = writeln!(out, "read:        {}", config.sheet.read_range);

    let client = SheetsClient::new(config.account, config.sheet);
    client.access_token().map_err(CliError::sheets)?;
    let _ = writeln!(out, "token:       ok");
    Ok(())
}
