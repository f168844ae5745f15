// Service-account identity used to sign token assertions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Everything needed to obtain an access token and address one spreadsheet.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccountConfig {
    /// Service-account e-mail, the assertion issuer.
    pub identity: String,
    /// PKCS#8 PEM private key.
    pub signing_key: String,
    pub scope: String,
    /// Token endpoint URL, also the assertion audience.
    pub audience: String,
    /// Spreadsheet id.
    pub resource_id: String,
}

impl fmt::Debug for ServiceAccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountConfig")
            .field("identity", &self.identity)
            .field("signing_key", &"<redacted>")
            .field("scope", &self.scope)
            .field("audience", &self.audience)
            .field("resource_id", &self.resource_id)
            .finish()
    }
}

/// The subset of a Google service-account JSON key we use.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleKeyFile {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl GoogleKeyFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::KeyFile {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Keys pasted into `.env` files usually carry literal `\n` sequences.
pub fn unescape_pem(key: &str) -> String {
    key.replace("\\n", "\n")
}
