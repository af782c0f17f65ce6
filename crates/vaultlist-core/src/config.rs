//! Tunables for list preparation.
//!
//! Every field has a default, so an empty file (or no file) is valid.
//!
//! # Example configuration
//!
//! ```toml
//! batch_size = 100
//! no_folder_threshold = 100
//! default_uri_match_type = "domain"
//! archive_items_enabled = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::UriMatchType;

/// Errors from loading or validating a [`PrepareConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this structure.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for a preparation pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PrepareConfig {
    /// Maximum number of items handed to one decrypt call.
    pub batch_size: usize,

    /// With no collections, fewer no-folder items than this are listed
    /// inline; otherwise they collapse into a single "No Folder" group.
    pub no_folder_threshold: usize,

    /// Match type used for login URIs that don't set one.
    pub default_uri_match_type: UriMatchType,

    /// Hide archived items from the main list and offer an archive group.
    pub archive_items_enabled: bool,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            no_folder_threshold: 100,
            default_uri_match_type: UriMatchType::Domain,
            archive_items_enabled: false,
        }
    }
}

impl PrepareConfig {
    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PrepareConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, or the defaults if it doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be greater than 0".into()));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_archive_items_enabled(mut self, enabled: bool) -> Self {
        self.archive_items_enabled = enabled;
        self
    }
}
