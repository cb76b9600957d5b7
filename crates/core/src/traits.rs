//! ObjectStore trait definition
//!
//! [`ObjectStore`] defines the storage operations the CLI needs: listing a
//! prefix, downloading one object and syncing a prefix into a local
//! directory. [`StoreProvider`] hands out a store signed with the current
//! credential. Both keep the CLI decoupled from the S3 SDK.

use std::path::Path;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::Serialize;

use crate::credential::Credential;
use crate::error::Result;
use crate::path::StorageUrl;

/// Metadata for an object or a common prefix
#[derive(Debug, Clone, Serialize)]
pub struct ObjectInfo {
    /// Full object key or prefix
    pub key: String,

    /// Size in bytes (None for prefixes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,

    /// Human-readable size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,

    /// Last modified timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    /// Whether this is a directory/prefix
    pub is_dir: bool,
}

impl ObjectInfo {
    /// Create a new ObjectInfo for an object
    pub fn file(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size_bytes: Some(size),
            size_human: Some(humansize::format_size(size.max(0) as u64, humansize::BINARY)),
            last_modified: None,
            is_dir: false,
        }
    }

    /// Create a new ObjectInfo for a common prefix
    pub fn dir(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size_bytes: None,
            size_human: None,
            last_modified: None,
            is_dir: true,
        }
    }
}

/// Outcome of a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Objects downloaded
    pub downloaded: usize,
    /// Objects already present locally with the same size
    pub skipped: usize,
    /// Bytes written
    pub bytes: u64,
}

impl SyncSummary {
    /// Fold another summary into this one
    pub fn merge(&mut self, other: &SyncSummary) {
        self.downloaded += other.downloaded;
        self.skipped += other.skipped;
        self.bytes += other.bytes;
    }
}

/// Storage operations used by the CLI
///
/// Implemented by the S3 adapter. Callers make sure credentials are valid
/// before each call.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List everything under a prefix
    ///
    /// Non-recursive listings group keys on `/` and report the groups as
    /// directories.
    async fn list(&self, prefix: &StorageUrl, recursive: bool) -> Result<Vec<ObjectInfo>>;

    /// Stream one object into `target`, returning the bytes written
    async fn download(&self, object: &StorageUrl, target: &Path) -> Result<u64>;

    /// Download every object under a prefix into `local_dir`
    ///
    /// Creates `local_dir` if absent. Objects already present locally with the
    /// same size are skipped.
    async fn sync(&self, prefix: &StorageUrl, local_dir: &Path) -> Result<SyncSummary> {
        crate::sync::sync_prefix(self, prefix, local_dir).await
    }
}

/// Source of object stores bound to a credential
///
/// `None` asks for a store using ambient credentials.
#[async_trait]
pub trait StoreProvider: Send {
    type Store: ObjectStore;

    async fn store(&mut self, credential: Option<&Credential>) -> Result<&Self::Store>;
}
