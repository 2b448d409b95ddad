//! Diff command

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use super::output::Output;
use crate::domain::{diff, ObjectDiff, Resource, TypeToken, Urn};
use crate::storage::{Checkpoint, Config};

/// How one resource changed between two checkpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ResourceChange {
    Created {
        urn: Urn,
    },
    Deleted {
        urn: Urn,
    },
    /// Same URN, different type
    Replaced {
        urn: Urn,
        old_type: TypeToken,
        new_type: TypeToken,
    },
    Updated {
        urn: Urn,
        inputs: ObjectDiff,
        outputs: ObjectDiff,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckpointDiff {
    pub changes: Vec<ResourceChange>,
    pub unchanged: usize,
}

impl CheckpointDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    fn count(&self, pred: impl Fn(&ResourceChange) -> bool) -> usize {
        self.changes.iter().filter(|c| pred(c)).count()
    }
}

/// Compares checkpoints by URN; deletions and updates follow `old`'s
/// order, creations follow `new`'s
pub fn compare(old: &Checkpoint, new: &Checkpoint) -> CheckpointDiff {
    let old_by_urn = index_by_urn(old);
    let new_by_urn = index_by_urn(new);
    let new_lookup: HashMap<&Urn, &Resource> = new_by_urn.iter().copied().collect();
    let mut result = CheckpointDiff::default();

    for (urn, before) in &old_by_urn {
        let Some(after) = new_lookup.get(urn) else {
            result.changes.push(ResourceChange::Deleted { urn: (*urn).clone() });
            continue;
        };

        if before.resource_type() != after.resource_type() {
            result.changes.push(ResourceChange::Replaced {
                urn: (*urn).clone(),
                old_type: before.resource_type().clone(),
                new_type: after.resource_type().clone(),
            });
            continue;
        }

        let inputs = diff(before.inputs(), after.inputs());
        let outputs = diff(before.outputs(), after.outputs());
        if inputs.any_changes() || outputs.any_changes() {
            result.changes.push(ResourceChange::Updated {
                urn: (*urn).clone(),
                inputs,
                outputs,
            });
        } else {
            result.unchanged += 1;
        }
    }

    let known: HashSet<&Urn> = old_by_urn.iter().map(|(u, _)| *u).collect();
    for (urn, _) in &new_by_urn {
        if !known.contains(urn) {
            result.changes.push(ResourceChange::Created { urn: (*urn).clone() });
        }
    }

    result
}

/// Pairs each resource with its URN, skipping (and warning about) resources without one
fn index_by_urn(checkpoint: &Checkpoint) -> Vec<(&Urn, &Resource)> {
    checkpoint
        .resources
        .iter()
        .filter_map(|r| match r.urn() {
            Some(urn) => Some((urn, r)),
            None => {
                tracing::warn!(ty = %r.resource_type(), "ignoring resource without a URN");
                None
            }
        })
        .collect()
}

/// Compares two checkpoint files
pub fn run(output: &Output, config: &Config, old: &Path, new: &Path) -> Result<()> {
    let before = Checkpoint::load(old, config.format)?;
    let after = Checkpoint::load(new, config.format)?;
    let result = compare(&before, &after);

    if output.is_json() {
        output.data(&result);
        return Ok(());
    }

    for change in &result.changes {
        match change {
            ResourceChange::Created { urn } => println!("+ {}", urn),
            ResourceChange::Deleted { urn } => println!("- {}", urn),
            ResourceChange::Replaced {
                urn,
                old_type,
                new_type,
            } => println!("+- {} ({} -> {})", urn, old_type, new_type),
            ResourceChange::Updated {
                urn,
                inputs,
                outputs,
            } => {
                println!("~ {}", urn);
                print_keys("inputs", inputs);
                print_keys("outputs", outputs);
            }
        }
    }

    println!(
        "{} created, {} deleted, {} replaced, {} updated, {} unchanged",
        result.count(|c| matches!(c, ResourceChange::Created { .. })),
        result.count(|c| matches!(c, ResourceChange::Deleted { .. })),
        result.count(|c| matches!(c, ResourceChange::Replaced { .. })),
        result.count(|c| matches!(c, ResourceChange::Updated { .. })),
        result.unchanged
    );

    Ok(())
}

fn print_keys(section: &str, d: &ObjectDiff) {
    for key in d.adds.keys() {
        println!("    + {}.{}", section, key);
    }
    for key in d.deletes.keys() {
        println!("    - {}.{}", section, key);
    }
    for key in d.updates.keys() {
        println!("    ~ {}.{}", section, key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PropertyMap, PropertyValue};

    fn resource(name: &str, ty: &str, size: f64) -> Resource {
        let mut inputs = PropertyMap::new();
        inputs.insert("size".into(), PropertyValue::Number(size));
        Resource::new(
            None,
            Some(Urn::from(format!("urn:rsnap:dev::{}::{}", ty, name))),
            TypeToken::from(ty),
            Some(inputs),
            None,
        )
    }

    #[test]
    fn identical_checkpoints_have_no_changes() {
        let a = Checkpoint::new("dev", vec![resource("a", "t", 1.0)]);
        let result = compare(&a, &a.clone());

        assert!(result.is_empty());
        assert_eq!(result.unchanged, 1);
    }

    #[test]
    fn classifies_changes() {
        let old = Checkpoint::new(
            "dev",
            vec![
                resource("keep", "t", 1.0),
                resource("grow", "t", 1.0),
                resource("gone", "t", 1.0),
            ],
        );
        let new = Checkpoint::new(
            "dev",
            vec![
                resource("fresh", "t", 1.0),
                resource("keep", "t", 1.0),
                resource("grow", "t", 2.0),
            ],
        );

        let result = compare(&old, &new);
        assert_eq!(result.unchanged, 1);
        assert_eq!(result.changes.len(), 3);

        assert!(matches!(
            &result.changes[0],
            ResourceChange::Updated { urn, inputs, .. }
                if urn.name() == "grow" && inputs.updates.contains_key("size")
        ));
        assert!(matches!(&result.changes[1], ResourceChange::Deleted { urn } if urn.name() == "gone"));
        assert!(matches!(&result.changes[2], ResourceChange::Created { urn } if urn.name() == "fresh"));
    }

    #[test]
    fn type_change_is_a_replacement() {
        let mut moved = resource("x", "t", 1.0);
        let urn = moved.urn().cloned().unwrap();
        moved = Resource::new(None, Some(urn), TypeToken::from("u"), Some(moved.inputs().clone()), None);

        let old = Checkpoint::new("dev", vec![resource("x", "t", 1.0)]);
        let new = Checkpoint::new("dev", vec![moved]);

        let result = compare(&old, &new);
        assert!(matches!(
            &result.changes[0],
            ResourceChange::Replaced { old_type, new_type, .. }
                if old_type.as_str() == "t" && new_type.as_str() == "u"
        ));
    }

    #[test]
    fn resources_without_urn_are_ignored() {
        let blank = Resource::new(None, None, TypeToken::from("t"), None, None);
        let old = Checkpoint::new("dev", vec![blank]);
        let new = Checkpoint::new("dev", vec![]);

        assert!(compare(&old, &new).is_empty());
    }
}
