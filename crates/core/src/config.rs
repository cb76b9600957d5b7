//! Configuration management
//!
//! This module loads the partload configuration file.
//! The file is TOML, stored at `<config dir>/partload/config.toml`, or in the
//! directory named by `PARTLOAD_CONFIG_DIR` when that is set.
//!
//! Command-line flags and environment variables take precedence over
//! anything read here.

use std::path::PathBuf;

use serde::Deserialize;

use crate::auth::{DEFAULT_AUTH_TIMEOUT_SECS, DEFAULT_AUTH_URL};
use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "PARTLOAD_CONFIG_DIR";

/// Default AWS region
const DEFAULT_REGION: &str = "us-east-1";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default dataset location and output settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Token exchange settings
    #[serde(default)]
    pub auth: AuthSettings,

    /// Object store settings
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Default values for data options
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Defaults {
    /// Bucket holding the datasets
    #[serde(default)]
    pub bucket: Option<String>,

    /// Account whose data to access
    #[serde(default)]
    pub account_id: Option<String>,

    /// Local directory `load` writes into
    #[serde(default)]
    pub output: Option<String>,
}

/// Token exchange settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// Token exchange endpoint
    #[serde(default = "default_auth_url")]
    pub url: String,

    /// Round-trip timeout in seconds
    #[serde(default = "default_auth_timeout")]
    pub timeout_secs: u64,
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

fn default_auth_timeout() -> u64 {
    DEFAULT_AUTH_TIMEOUT_SECS
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            url: default_auth_url(),
            timeout_secs: default_auth_timeout(),
        }
    }
}

/// Object store settings
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint for S3-compatible stores
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing
    #[serde(default)]
    pub force_path_style: bool,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint_url: None,
            force_path_style: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            auth: AuthSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

/// Configuration manager handles loading and saving config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager for the default location
    ///
    /// Honors `PARTLOAD_CONFIG_DIR`.
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("partload"),
        };
        Ok(Self {
            config_path: config_dir.join("config.toml"),
        })
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// A missing file yields the default configuration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&content)?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade partload.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(config)
    }
}
