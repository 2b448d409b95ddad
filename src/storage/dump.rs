//! Heap dumps
//!
//! A heap dump is how an evaluator hands its object graph across a process
//! boundary: the arena of runtime objects plus the resources to snapshot,
//! listed in dependency order.
//!
//! ```yaml
//! namespace: dev
//! objects:
//!   - type: { kind: string }
//!     value: { kind: string, value: logs }
//!   - type: { kind: resource, token: "aws:s3:Bucket" }
//!     value: { kind: object, value: { name: 0 } }
//! resources:
//!   - { object: 1, name: logs }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::format::SnapshotFormat;
use crate::domain::{Heap, ObjectGraph, ResourceDecl};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeapDump {
    /// Overrides the configured namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    pub objects: Heap,

    /// Resources to snapshot, in dependency order
    #[serde(default)]
    pub resources: Vec<ResourceDecl>,
}

impl HeapDump {
    /// Reads a dump (YAML for `.yaml`/`.yml`, JSON otherwise) and validates it
    pub fn load(path: &Path) -> Result<Self> {
        let format = SnapshotFormat::from_path(path).unwrap_or(SnapshotFormat::Json);
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read heap dump: {}", path.display()))?;

        let dump: HeapDump = format
            .parse(&content)
            .with_context(|| format!("Failed to load heap dump: {}", path.display()))?;

        dump.validate()
            .with_context(|| format!("Invalid heap dump: {}", path.display()))?;
        Ok(dump)
    }

    /// Checks that every object the dump mentions exists
    pub fn validate(&self) -> Result<()> {
        self.objects.validate()?;
        for decl in &self.resources {
            self.objects
                .require(decl.object)
                .with_context(|| format!("Resource '{}' refers to a missing object", decl.name))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ObjectId, Type};
    use tempfile::TempDir;

    const YAML: &str = r#"
namespace: dev
objects:
  - type: { kind: string }
    value: { kind: string, value: logs }
  - type: { kind: resource, token: "aws:s3:Bucket" }
    value: { kind: object, value: { name: 0 } }
resources:
  - { object: 1, name: logs }
"#;

    #[test]
    fn loads_yaml_dump() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heap.yaml");
        fs::write(&path, YAML).unwrap();

        let dump = HeapDump::load(&path).unwrap();
        assert_eq!(dump.namespace.as_deref(), Some("dev"));
        assert_eq!(dump.objects.len(), 2);
        assert_eq!(dump.resources, vec![ResourceDecl::new(ObjectId(1), "logs")]);
        assert!(dump.objects.require(ObjectId(1)).unwrap().declared_type().is_resource());
    }

    #[test]
    fn json_roundtrip() {
        let mut heap = Heap::new();
        let n = heap.number(3.0);
        let r = heap.resource("t:m:R", [("count", n)]);
        heap.computed(Type::Bool, true, vec![r]);

        let dump = HeapDump {
            namespace: None,
            objects: heap.clone(),
            resources: vec![ResourceDecl::new(r, "r")],
        };

        let json = serde_json::to_string(&dump).unwrap();
        let parsed: HeapDump = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.objects, heap);
        assert!(parsed.namespace.is_none());
    }

    #[test]
    fn rejects_missing_resource_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heap.json");
        fs::write(&path, r#"{"objects": [], "resources": [{"object": 3, "name": "x"}]}"#).unwrap();

        let err = HeapDump::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("refers to a missing object"));
    }

    #[test]
    fn rejects_dangling_property() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heap.json");
        fs::write(
            &path,
            r#"{"objects": [{"type": {"kind": "object"}, "value": {"kind": "object", "value": {"a": 9}}}]}"#,
        )
        .unwrap();

        let err = HeapDump::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("#9"));
    }
}
