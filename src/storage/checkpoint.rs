//! Checkpoint files
//!
//! A checkpoint is the persisted result of one snapshot: the namespace, when
//! it was taken, and every resource in snapshot order. Writes go to a
//! locked temp file that is then renamed over the target.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use super::format::SnapshotFormat;
use crate::domain::{Resource, Urn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub namespace: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Checkpoint {
    /// Creates a checkpoint stamped with the current time
    pub fn new(namespace: impl Into<String>, resources: Vec<Resource>) -> Self {
        Self {
            namespace: namespace.into(),
            created_at: Utc::now(),
            resources,
        }
    }

    /// Finds a resource by URN
    pub fn find(&self, urn: &Urn) -> Option<&Resource> {
        self.resources.iter().find(|r| r.urn() == Some(urn))
    }

    /// Reads a checkpoint; the extension picks the format, else `fallback`
    pub fn load(path: &Path, fallback: SnapshotFormat) -> Result<Self> {
        let format = SnapshotFormat::from_path(path).unwrap_or(fallback);
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read checkpoint: {}", path.display()))?;

        format
            .parse(&content)
            .with_context(|| format!("Failed to load checkpoint: {}", path.display()))
    }

    /// Writes the checkpoint atomically
    pub fn save(&self, path: &Path, fallback: SnapshotFormat) -> Result<()> {
        let format = SnapshotFormat::from_path(path).unwrap_or(fallback);
        let content = format.render(self).context("Failed to serialize checkpoint")?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = Path::new(&temp_name);

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .context("Failed to acquire write lock on checkpoint")?;

            file.write_all(content.as_bytes())
                .context("Failed to write checkpoint")?;
            if !content.ends_with('\n') {
                file.write_all(b"\n").context("Failed to write checkpoint")?;
            }
            file.flush().context("Failed to flush checkpoint")?;
        }

        fs::rename(temp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                path.display()
            )
        })
    }
}
