//! Service-account token exchange.
//!
//! A self-signed RS256 assertion is traded for a short-lived bearer token at
//! the configured token endpoint (the JWT bearer grant).

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use bookreg_config::ServiceAccountConfig;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::Failure;

/// Assertion lifetime in seconds.
pub const ASSERTION_TTL_SECS: i64 = 3600;

pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
    pub alg: String,
    pub typ: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            alg: "RS256".into(),
            typ: "JWT".into(),
        }
    }
}

/// Assertion claims, in the order they are serialized.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(account: &ServiceAccountConfig, issued_at: i64) -> Self {
        Self {
            iss: account.identity.clone(),
            scope: account.scope.clone(),
            aud: account.audience.clone(),
            exp: issued_at + ASSERTION_TTL_SECS,
            iat: issued_at,
        }
    }
}

/// Bearer token returned by the exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    /// Unix seconds after which the token must not be reused.
    pub expires_at: i64,
}

impl AccessToken {
    /// Still usable at `now`, keeping a minute of slack.
    pub fn is_fresh(&self, now: i64) -> bool {
        now + 60 < self.expires_at
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, Failure> {
    let json = serde_json::to_vec(value).map_err(|e| Failure::Parse(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// RSASSA-PKCS1-v1_5 / SHA-256 signature of `message` with a PKCS#8 PEM key.
pub fn sign(private_key_pem: &str, message: &[u8]) -> Result<Vec<u8>, Failure> {
    let key = RsaPrivateKey::from_pkcs8_pem(private_key_pem.trim())
        .map_err(|e| Failure::Key(e.to_string()))?;
    let signer = SigningKey::<Sha256>::new(key);
    let signature = signer
        .try_sign(message)
        .map_err(|e| Failure::Key(e.to_string()))?;
    Ok(signature.to_vec())
}

/// Build the signed `header.claims.signature` assertion.
pub fn build_assertion(account: &ServiceAccountConfig, issued_at: i64) -> Result<String, Failure> {
    let signing_input = format!(
        "{}.{}",
        encode_segment(&Header::default())?,
        encode_segment(&Claims::new(account, issued_at))?
    );
    let signature = sign(&account.signing_key, signing_input.as_bytes())?;
    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

/// Form body for the token request. Assertions are base64url and dot
/// separated, so they need no further escaping.
pub fn token_request_body(assertion: &str) -> String {
    format!("grant_type={}&assertion={}", JWT_BEARER_GRANT, assertion)
}

/// Sign an assertion for `account` and exchange it at `account.audience`.
pub fn exchange(
    http: &reqwest::blocking::Client,
    account: &ServiceAccountConfig,
    issued_at: i64,
) -> Result<AccessToken, Failure> {
    let assertion = build_assertion(account, issued_at)?;
    log::debug!("requesting access token for {} from {}", account.identity, account.audience);

    let resp = http
        .post(&account.audience)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(token_request_body(&assertion))
        .send()
        .map_err(|e| Failure::Network(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(Failure::Http(status.as_u16(), body));
    }

    let body: TokenResponse = resp.json().map_err(|e| Failure::Parse(e.to_string()))?;
    let value = body
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Failure::Parse("token response missing access_token".into()))?;

    Ok(AccessToken {
        value,
        expires_at: issued_at + body.expires_in.unwrap_or(ASSERTION_TTL_SECS),
    })
}
