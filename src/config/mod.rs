//! Configuration for ocp-complete.
//!
//! Handles loading and parsing the `~/.ocp-complete.toml` file and the
//! per-buffer [`Settings`] the host passes along with each view.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogConfig;
use crate::ocp::OcpIndex;

/// Config file name in the home directory.
const CONFIG_FILE_NAME: &str = ".ocp-complete.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Per-buffer settings consulted when querying `ocp-index`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Build directory override, passed through as `--build=`.
    #[serde(rename = "sublime_ocp_index_build_dir", default)]
    pub build_dir: Option<PathBuf>,
}

impl Settings {
    /// Sets the build directory.
    #[must_use]
    pub fn with_build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_dir = Some(dir.into());
        self
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings applied to every buffer.
    #[serde(flatten)]
    pub settings: Settings,
    /// Fixed `ocp-index` binary, bypassing the PATH/opam lookup.
    pub ocp_index_path: Option<PathBuf>,
    /// Include directories used when the host has no window folders.
    pub folders: Vec<PathBuf>,
    /// Logging configuration.
    pub log: LogConfig,
    /// Path the config was loaded from.
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Config {
    /// Returns the default config file path (~/.ocp-complete.toml).
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE_NAME)
    }

    /// Loads configuration from the default path.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load_from`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_config_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read, and
    /// [`ConfigError::Parse`] if its content is not a valid config.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self {
                config_path: path.to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::parse(&content)?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    /// Parses config file content.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or mistyped keys.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Returns the `ocp-index` runner this config selects.
    #[must_use]
    pub fn index_tool(&self) -> OcpIndex {
        match self.ocp_index_path {
            Some(ref path) => OcpIndex::with_binary(path),
            None => OcpIndex::new(),
        }
    }
}
