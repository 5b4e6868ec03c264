//! Layered configuration.
//!
//! Precedence, lowest to highest: built-in defaults, optional TOML file,
//! environment variables (`REPLICA` prefix, `__` separator). CLI arguments
//! override the loaded values at the call site.

use crate::error::SyncError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Mirroring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Source directory; CLI positional argument takes precedence
    #[serde(default)]
    pub source: Option<PathBuf>,

    /// Replica directory; CLI positional argument takes precedence
    #[serde(default)]
    pub replica: Option<PathBuf>,

    /// Seconds between reconciliation passes in daemon mode
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_interval_secs() -> u64 {
    60
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            source: None,
            replica: None,
            interval_secs: default_interval_secs(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from an optional file with environment overlay.
    pub fn load(file: Option<&Path>) -> Result<SyncConfig, SyncError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            let path_str = path.to_str().ok_or_else(|| {
                SyncError::Config(format!(
                    "config path is not valid UTF-8: {}",
                    path.display()
                ))
            })?;
            builder = builder.add_source(File::with_name(path_str));
        }
        builder = builder.add_source(
            Environment::with_prefix("REPLICA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?;
        config
            .try_deserialize()
            .map_err(|e| SyncError::Config(e.to_string()))
    }

    /// Create default configuration.
    pub fn default() -> SyncConfig {
        SyncConfig::default()
    }
}
