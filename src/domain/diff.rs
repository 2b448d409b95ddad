//! Property diffs
//!
//! Compares two property maps key by key. Values are compared structurally,
//! so two independently cloned snapshots of the same state diff as equal.

use serde::Serialize;
use std::collections::BTreeMap;

use super::property::{PropertyKey, PropertyMap, PropertyValue};

/// A changed property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueDiff {
    pub old: PropertyValue,
    pub new: PropertyValue,
}

/// Differences between two property maps
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectDiff {
    /// Keys only present in the new map
    pub adds: PropertyMap,
    /// Keys only present in the old map
    pub deletes: PropertyMap,
    /// Keys present in both, with different values
    pub updates: BTreeMap<PropertyKey, ValueDiff>,
    /// Keys present in both with equal values
    #[serde(skip)]
    pub sames: PropertyMap,
}

impl ObjectDiff {
    /// Returns true if anything was added, deleted, or updated
    pub fn any_changes(&self) -> bool {
        !self.adds.is_empty() || !self.deletes.is_empty() || !self.updates.is_empty()
    }

    /// Keys that differ, in stable order
    pub fn changed_keys(&self) -> Vec<&PropertyKey> {
        let mut keys: Vec<_> = self
            .adds
            .keys()
            .chain(self.deletes.keys())
            .chain(self.updates.keys())
            .collect();
        keys.sort();
        keys
    }
}

/// Computes the differences going from `old` to `new`
pub fn diff(old: &PropertyMap, new: &PropertyMap) -> ObjectDiff {
    let mut result = ObjectDiff::default();

    for (key, old_value) in old {
        match new.get(key) {
            Some(new_value) if new_value == old_value => {
                result.sames.insert(key.clone(), old_value.clone());
            }
            Some(new_value) => {
                result.updates.insert(
                    key.clone(),
                    ValueDiff {
                        old: old_value.clone(),
                        new: new_value.clone(),
                    },
                );
            }
            None => {
                result.deletes.insert(key.clone(), old_value.clone());
            }
        }
    }

    for (key, new_value) in new {
        if !old.contains_key(key) {
            result.adds.insert(key.clone(), new_value.clone());
        }
    }

    result
}
