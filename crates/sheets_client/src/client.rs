//! Sheets HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! Covers the registration flow: token → append, and the admin flow:
//! token → read.

use std::sync::Mutex;
use std::time::Duration;

use bookreg_config::{ServiceAccountConfig, SheetConfig};
use bookreg_core::{AppendRows, BookRecord, Submission};
use serde::Deserialize;

use crate::error::{Failure, SheetsError};
use crate::token::{self, AccessToken};

/// Sheets API client (blocking).
pub struct SheetsClient {
    http: reqwest::blocking::Client,
    account: ServiceAccountConfig,
    sheet: SheetConfig,
    token: Mutex<Option<AccessToken>>,
}

/// `values` response body. Google omits `values` when the range is empty.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsClient {
    pub fn new(account: ServiceAccountConfig, sheet: SheetConfig) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("bookreg/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            account,
            sheet,
            token: Mutex::new(None),
        }
    }

    pub fn account(&self) -> &ServiceAccountConfig {
        &self.account
    }

    pub fn sheet(&self) -> &SheetConfig {
        &self.sheet
    }

    /// Current bearer token, exchanging a fresh assertion when none is
    /// cached or the cached one is about to expire.
    pub fn access_token(&self) -> Result<String, SheetsError> {
        let now = chrono::Utc::now().timestamp();
        let mut cached = self
            .token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let fresh = token::exchange(&self.http, &self.account, now).map_err(SheetsError::Auth)?;
        log::info!("obtained access token for {}", self.account.identity);
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    /// Append `rows` after the last filled row of the append range, one call
    /// for the whole batch. Each row gets `submitted_at` as its tenth cell.
    pub fn append_rows(&self, rows: &[BookRecord], submitted_at: &str) -> Result<usize, SheetsError> {
        let token = self.access_token()?;
        let url = self
            .values_url(&format!("{}:append", self.sheet.append_range))
            .map_err(SheetsError::Save)?;
        let values: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.to_append_values(submitted_at))
            .collect();

        let resp = self
            .http
            .post(url)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&serde_json::json!({ "values": values }))
            .send()
            .map_err(|e| SheetsError::Save(Failure::Network(e.to_string())))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(SheetsError::Save(Failure::Http(status.as_u16(), body)));
        }

        log::info!("appended {} row(s) to {}", rows.len(), self.sheet.append_range);
        Ok(rows.len())
    }

    /// Every row of the read range, mapped positionally.
    pub fn read_submissions(&self) -> Result<Vec<Submission>, SheetsError> {
        let token = self.access_token()?;
        let url = self.values_url(&self.sheet.read_range).map_err(SheetsError::Load)?;

        let resp = self
            .http
            .get(url)
            .bearer_auth(&token)
            .send()
            .map_err(|e| SheetsError::Load(Failure::Network(e.to_string())))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(SheetsError::Load(Failure::Http(status.as_u16(), body)));
        }

        let range: ValueRange = resp
            .json()
            .map_err(|e| SheetsError::Load(Failure::Parse(e.to_string())))?;

        let submissions: Vec<Submission> = range
            .values
            .iter()
            .map(|row| {
                let cells: Vec<String> = row.iter().map(cell_text).collect();
                Submission::from_values(&cells)
            })
            .collect();

        log::debug!("read {} row(s) from {}", submissions.len(), self.sheet.read_range);
        Ok(submissions)
    }
}

impl SheetsClient {
    /// `{api_base}/v4/spreadsheets/{id}/values/{range}` with the id and range
    /// percent-encoded as single path segments, so sheet names may contain
    /// `#`, `?`, `/` or spaces.
    fn values_url(&self, range: &str) -> Result<reqwest::Url, Failure> {
        let mut url = reqwest::Url::parse(&self.sheet.api_base)
            .map_err(|e| Failure::Url(format!("{}: {}", self.sheet.api_base, e)))?;
        url.path_segments_mut()
            .map_err(|_| Failure::Url(format!("{}: cannot be a base", self.sheet.api_base)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.account.resource_id.as_str(), "values", range]);
        Ok(url)
    }
}

impl AppendRows for SheetsClient {
    type Error = SheetsError;

    fn append_rows(&self, rows: &[BookRecord], submitted_at: &str) -> Result<(), SheetsError> {
        SheetsClient::append_rows(self, rows, submitted_at).map(|_| ())
    }
}

/// Render one cell as text. Formatted values come back as strings, but
/// unformatted reads can carry numbers and booleans.
fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
