//! Snapshot command

use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::take_snapshot;
use crate::storage::{Checkpoint, Config, HeapDump, SnapshotFormat};

/// Snapshots the resources declared in a heap dump
pub fn run(
    output: &Output,
    config: &Config,
    dump_path: &Path,
    out: Option<&Path>,
    namespace: Option<&str>,
    encoding: Option<SnapshotFormat>,
) -> Result<()> {
    let dump = HeapDump::load(dump_path)?;
    tracing::debug!(
        objects = dump.objects.len(),
        resources = dump.resources.len(),
        "loaded heap dump"
    );

    let namespace = namespace
        .or(dump.namespace.as_deref())
        .unwrap_or(&config.namespace)
        .to_string();
    Config::validate_namespace(&namespace)?;

    let resources = take_snapshot(&dump.objects, &namespace, &dump.resources)
        .with_context(|| format!("Failed to snapshot {}", dump_path.display()))?;
    let checkpoint = Checkpoint::new(namespace, resources);
    let format = encoding.unwrap_or(config.format);

    match out {
        Some(path) => {
            checkpoint.save(path, format)?;

            let urns: Vec<String> = checkpoint
                .resources
                .iter()
                .filter_map(|r| r.urn().map(ToString::to_string))
                .collect();

            if output.is_json() {
                output.data(&serde_json::json!({
                    "written": path.display().to_string(),
                    "namespace": checkpoint.namespace,
                    "resources": urns,
                }));
            } else {
                output.success(&format!(
                    "Snapshotted {} resource(s) to {}",
                    urns.len(),
                    path.display()
                ));
                for urn in &urns {
                    println!("  {}", urn);
                }
            }
        }
        None if output.is_json() => output.data(&checkpoint),
        None => {
            let rendered = format.render(&checkpoint)?;
            println!("{}", rendered.trim_end());
        }
    }

    Ok(())
}
