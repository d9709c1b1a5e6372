//! Configuration for the decorator composition engine.
//!
//! Configuration is plain serde data, read from JSON. Every field has a
//! default, so an empty object is a valid configuration.

#![warn(missing_docs, clippy::pedantic)]

use std::fs;
use std::path::{Path, PathBuf};

use decorator_primitives::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Standard version assumed when a request carries no `Version` decorator.
pub const DEFAULT_STANDARD_VERSION: Version = Version::new(1, 0, 0);

fn default_standard_version() -> Version {
    DEFAULT_STANDARD_VERSION
}

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration `{}`: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Source [`std::io::Error`].
        #[source]
        source: std::io::Error,
    },
    /// A configuration file was read but its content is invalid.
    #[error("invalid configuration file `{}`: {source}", path.display())]
    InvalidFile {
        /// File that was being parsed.
        path: PathBuf,
        /// Source [`serde_json::Error`].
        #[source]
        source: serde_json::Error,
    },
    /// The configuration was not valid JSON or had wrong field types.
    #[error("invalid configuration: {source}")]
    Parse {
        /// Source [`serde_json::Error`].
        #[from]
        source: serde_json::Error,
    },
}

/// Settings consumed by the composition engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineConfig {
    /// Latest standard version, used when no `Version` decorator is present.
    #[serde(default = "default_standard_version")]
    pub standard_version: Version,
    /// Model the composed prompt is destined for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_model: Option<String>,
    /// Reject decorators that do not list the target model instead of
    /// logging a warning.
    #[serde(default)]
    pub strict_models: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            standard_version: DEFAULT_STANDARD_VERSION,
            target_model: None,
            strict_models: false,
        }
    }
}

impl EngineConfig {
    /// Parses configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON, unknown fields, or
    /// an invalid version string.
    pub fn from_json_str(input: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Reads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::InvalidFile`] when its content is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::InvalidFile {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), standard = %config.standard_version, "loaded engine configuration");
        Ok(config)
    }

    /// Sets the assumed standard version.
    #[must_use]
    pub fn with_standard_version(mut self, version: Version) -> Self {
        self.standard_version = version;
        self
    }

    /// Sets the target model.
    #[must_use]
    pub fn with_target_model(mut self, model: impl Into<String>) -> Self {
        self.target_model = Some(model.into());
        self
    }

    /// Enables or disables strict model checking.
    #[must_use]
    pub fn with_strict_models(mut self, strict: bool) -> Self {
        self.strict_models = strict;
        self
    }
}
