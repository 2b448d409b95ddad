//! Encodings for checkpoints and heap dumps

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// File encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotFormat {
    #[default]
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// Infers the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(SnapshotFormat::Json),
            "yaml" | "yml" => Some(SnapshotFormat::Yaml),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SnapshotFormat::Json => "json",
            SnapshotFormat::Yaml => "yaml",
        }
    }

    /// Encodes a value (JSON is pretty-printed)
    pub fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            SnapshotFormat::Json => {
                serde_json::to_string_pretty(value).context("Failed to encode JSON")
            }
            SnapshotFormat::Yaml => serde_yaml::to_string(value).context("Failed to encode YAML"),
        }
    }

    /// Decodes a value
    pub fn parse<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        match self {
            SnapshotFormat::Json => serde_json::from_str(content).context("Failed to parse JSON"),
            SnapshotFormat::Yaml => serde_yaml::from_str(content).context("Failed to parse YAML"),
        }
    }
}
