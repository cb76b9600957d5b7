//! Token exchange
//!
//! Trades a long-lived access token for short-lived storage credentials.
//! The exchange is a single `GET` with the token as a bearer credential;
//! a 200 answer carries the keys, their expiry and the account base path.

use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::Deserialize;

use crate::credential::Credential;
use crate::error::{Error, Result};
use crate::partition::normalize_base_path;

/// Token exchange endpoint used when none is configured
pub const DEFAULT_AUTH_URL: &str = "https://auth.partload.dev/v1/storage-credentials";

/// Default time allowed for the exchange round trip
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 30;

/// Exchanges an access token for a credential
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Perform one exchange. An empty token fails without touching the network.
    async fn authenticate(&self, token: &str) -> Result<Credential>;
}

/// Authenticator talking HTTP to the token exchange endpoint
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpAuthenticator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    fn map_transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::AuthTimeout(self.timeout)
        } else {
            Error::Network(format!("Token exchange request failed: {err}"))
        }
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<Credential> {
        if token.trim().is_empty() {
            return Err(Error::MissingToken);
        }

        tracing::debug!(url = %self.url, "Exchanging access token for credentials");

        let response = self
            .client
            .get(&self.url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        parse_exchange_response(status, &body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeResponse {
    credentials: Option<ExchangeCredentials>,
    s3_path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeCredentials {
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    session_token: Option<String>,
    expiration: Option<serde_json::Value>,
}

/// Turn a token exchange answer into a credential
///
/// Any status other than 200 is an API error carrying the body. Every field
/// must be present and non-empty; nothing is returned otherwise.
pub fn parse_exchange_response(status: u16, body: &str) -> Result<Credential> {
    if status != 200 {
        return Err(Error::auth_api(status, body));
    }

    let response: ExchangeResponse = serde_json::from_str(body)
        .map_err(|e| Error::MalformedResponse(format!("Response is not valid JSON: {e}")))?;

    let credentials = response
        .credentials
        .ok_or_else(|| missing("credentials"))?;

    let access_key_id = required("credentials.accessKeyId", credentials.access_key_id)?;
    let secret_access_key =
        required("credentials.secretAccessKey", credentials.secret_access_key)?;
    let session_token = required("credentials.sessionToken", credentials.session_token)?;
    let expires_at_ms = expiration_ms(credentials.expiration)?;
    let base_path = required("s3Path", response.s3_path)?;

    Ok(Credential {
        access_key_id,
        secret_access_key,
        session_token,
        expires_at_ms,
        base_path: normalize_base_path(&base_path),
    })
}

fn missing(field: &str) -> Error {
    Error::MalformedResponse(format!("Missing or empty field '{field}'"))
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(missing(field)),
    }
}

fn expiration_ms(value: Option<serde_json::Value>) -> Result<i64> {
    const FIELD: &str = "credentials.expiration";
    match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s
            .trim()
            .parse::<Timestamp>()
            .map(|ts| ts.as_millisecond())
            .map_err(|e| Error::MalformedResponse(format!("Invalid '{FIELD}' value '{s}': {e}"))),
        Some(serde_json::Value::Number(n)) => n.as_i64().ok_or_else(|| {
            Error::MalformedResponse(format!("Invalid '{FIELD}' value {n}: expected epoch ms"))
        }),
        _ => Err(missing(FIELD)),
    }
}
