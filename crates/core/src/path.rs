//! Storage URL parsing
//!
//! Handles absolute partition paths of the form `s3://bucket[/key]`.
//! The key is kept verbatim (no percent-decoding) so it matches the object
//! keys the store reports.

use crate::error::{Error, Result};

/// The only scheme the object store adapter understands
pub const S3_SCHEME: &str = "s3";

/// A parsed `s3://bucket/key` location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageUrl {
    /// Bucket name
    pub bucket: String,
    /// Object key or key prefix (empty for bucket root)
    pub key: String,
}

impl StorageUrl {
    /// Create a new StorageUrl
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse an `s3://bucket[/key]` string
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(Error::InvalidPath("Path cannot be empty".into()));
        }

        let url = url::Url::parse(input)?;
        if url.scheme() != S3_SCHEME {
            return Err(Error::InvalidPath(format!(
                "Unsupported scheme '{}' in '{input}': expected s3://",
                url.scheme()
            )));
        }

        let rest = &input[S3_SCHEME.len() + "://".len()..];
        let (bucket, key) = match rest.split_once('/') {
            Some((bucket, key)) => (bucket, key),
            None => (rest, ""),
        };

        if bucket.is_empty() {
            return Err(Error::InvalidPath(format!(
                "Bucket name cannot be empty in '{input}'"
            )));
        }

        Ok(Self::new(bucket, key))
    }

    /// Key of `object_key` relative to this prefix, if it lies underneath
    pub fn relative_key<'a>(&self, object_key: &'a str) -> Option<&'a str> {
        object_key.strip_prefix(self.key.as_str())
    }
}

impl std::fmt::Display for StorageUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{S3_SCHEME}://{}/{}", self.bucket, self.key)
    }
}
