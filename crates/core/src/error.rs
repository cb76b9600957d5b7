//! Error types for pl-core
//!
//! Provides a unified error type that the CLI converts into an exit code.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for pl-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum length of an auth response body kept in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error types for pl-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Start date is after end date
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    /// Invalid user input (unknown dataset type, malformed date, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication requested without a token
    #[error("No access token provided. Use --token or set PARTLOAD_TOKEN.")]
    MissingToken,

    /// Token exchange answered with a non-200 status
    #[error("Authentication failed with status {status}: {body}")]
    AuthApi { status: u16, body: String },

    /// Token exchange answered 200 but a required field is missing
    #[error("Malformed authentication response: {0}")]
    MalformedResponse(String),

    /// Token exchange did not complete in time
    #[error("Authentication timed out after {0:?}")]
    AuthTimeout(Duration),

    /// Neither a token nor bucket/account id to locate the dataset
    #[error("Cannot determine base path: provide --token, or both --bucket and --account-id")]
    MissingBasePath,

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid storage path format
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Network error talking to the token exchange or the object store
    #[error("Network error: {0}")]
    Network(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Build an `AuthApi` error, truncating oversized bodies
    pub fn auth_api(status: u16, body: &str) -> Self {
        let body = if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut cut = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        };
        Error::AuthApi { status, body }
    }

    /// Get the exit code for this error
    ///
    /// Every failure aborts the invocation with status 1.
    pub const fn exit_code(&self) -> i32 {
        1
    }
}
