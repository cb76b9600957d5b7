//! pl-core: Core library for the partload dataset CLI
//!
//! This crate provides the core functionality for partload, including:
//! - Calendar date range expansion
//! - Partition path derivation
//! - Storage URL parsing
//! - Credential storage and the token exchange
//! - Session management (authenticate once, refresh on expiry)
//! - Configuration management
//! - ObjectStore trait for storage operations and prefix sync
//!
//! This crate is independent of the S3 SDK, so everything here can be tested
//! without a storage backend.

pub mod auth;
pub mod config;
pub mod credential;
pub mod dates;
pub mod error;
pub mod partition;
pub mod path;
pub mod session;
pub mod sync;
pub mod traits;

pub use auth::{Authenticator, HttpAuthenticator};
pub use config::{Config, ConfigManager};
pub use credential::{Credential, CredentialStore};
pub use dates::{DateRange, expand, parse_date};
pub use error::{Error, Result};
pub use partition::{DatasetType, PartitionDimension, PartitionPath, PathSpec, build_paths};
pub use path::StorageUrl;
pub use session::SessionManager;
pub use sync::sync_prefix;
pub use traits::{ObjectInfo, ObjectStore, StoreProvider, SyncSummary};
