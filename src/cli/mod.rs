//! # Command-Line Interface
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `snapshot <dump>` | Clone every declared resource of a heap dump into a checkpoint |
//! | `diff <old> <new>` | Compare two checkpoints resource by resource |
//! | `id` | Generate a unique hex identifier |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Diagnostics are written to stderr through `tracing`. `RUST_LOG` selects
//! the filter; `--verbose` turns on debug output when it is unset:
//! ```bash
//! rsnap --verbose snapshot heap.yaml
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod diff_cmd;
mod id_cmd;
mod output;
mod snapshot_cmd;

pub use app::{run, Cli, Commands};
pub use diff_cmd::{compare, CheckpointDiff, ResourceChange};
pub use output::{Output, OutputFormat};
