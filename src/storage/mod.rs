//! # Storage Layer
//!
//! File formats around the snapshot core.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Config | TOML | `rsnap.toml` or `~/.config/rsnap/config.toml` |
//! | Heap dumps | JSON or YAML | any path (input) |
//! | Checkpoints | JSON or YAML | any path (output) |
//!
//! The format of a dump or checkpoint follows its extension (`.json`,
//! `.yaml`, `.yml`); checkpoints without one use the configured format.
//!
//! ## Key Types
//!
//! - [`Config`] - Namespace, default format, and unique ID policy
//! - [`HeapDump`] - Object graph plus ordered resource declarations
//! - [`Checkpoint`] - Persisted snapshot result

mod checkpoint;
mod config;
mod dump;
mod format;

pub use checkpoint::Checkpoint;
pub use config::{Config, ConfigError, UniqueIdConfig, CONFIG_FILE};
pub use dump::HeapDump;
pub use format::SnapshotFormat;
