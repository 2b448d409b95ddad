//! Configuration handling
//!
//! Configuration is read from `rsnap.toml` in the working directory (or the
//! nearest parent that has one), falling back to the global
//! `~/.config/rsnap/config.toml`, and finally to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::format::SnapshotFormat;

/// Name of the per-project configuration file
pub const CONFIG_FILE: &str = "rsnap.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Policy for generated unique IDs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UniqueIdConfig {
    /// Prefix prepended to the random hex
    pub prefix: String,

    /// Number of random bytes (each becomes two hex characters)
    pub random_bytes: usize,

    /// Maximum total length, prefix included
    pub max_len: usize,
}

impl Default for UniqueIdConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            random_bytes: 8,
            max_len: 64,
        }
    }
}

/// Snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Namespace used when minting URNs
    pub namespace: String,

    /// Encoding for checkpoints whose path has no recognized extension
    pub format: SnapshotFormat,

    /// Unique ID settings
    pub unique_id: UniqueIdConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: "default".to_string(),
            format: SnapshotFormat::Json,
            unique_id: UniqueIdConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from an explicit path, or from default locations
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }

        if let Some(path) = Self::find_project_config() {
            return Self::from_path(&path);
        }

        match Self::global_config_dir().map(|dir| dir.join("config.toml")) {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Reads and validates a configuration file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "rsnap", "rsnap").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Finds `rsnap.toml` in the current directory or a parent
    pub fn find_project_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let candidate = current.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Checks values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::validate_namespace(&self.namespace)?;
        if self.unique_id.max_len == 0 {
            return Err(ConfigError::Invalid("unique_id.max_len must be positive".into()));
        }
        Ok(())
    }

    /// Checks that a namespace can be embedded in a URN
    pub fn validate_namespace(namespace: &str) -> Result<(), ConfigError> {
        if namespace.is_empty() {
            return Err(ConfigError::Invalid("namespace must not be empty".into()));
        }
        if namespace.contains("::") {
            return Err(ConfigError::Invalid(format!(
                "namespace '{}' must not contain '::'",
                namespace
            )));
        }
        Ok(())
    }
}
