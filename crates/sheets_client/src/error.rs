/// What went wrong on the wire.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// Private key could not be parsed or used
    #[error("invalid signing key: {0}")]
    Key(String),
    #[error("network error: {0}")]
    Network(String),
    /// Non-2xx status with the response body
    #[error("HTTP {0}: {1}")]
    Http(u16, String),
    /// Response body did not have the expected shape
    #[error("unexpected response: {0}")]
    Parse(String),
    /// `api_base` could not be turned into a request URL
    #[error("invalid request URL: {0}")]
    Url(String),
}

/// Sheet operation failure, by stage.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("authentication failed: {0}")]
    Auth(#[source] Failure),
    #[error("saving rows failed: {0}")]
    Save(#[source] Failure),
    #[error("loading rows failed: {0}")]
    Load(#[source] Failure),
}
