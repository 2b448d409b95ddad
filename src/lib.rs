//! resource-snapshot - snapshots evaluated infrastructure object graphs
//!
//! Walks the runtime objects an evaluator produced for each resource and
//! clones them into stable, type-tagged property maps: references to other
//! resources become URNs and values not known yet become `computed` or
//! `output` placeholders. The result can be persisted, diffed, or sent to a
//! provider without access to the runtime.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Cloner, Context, Heap, InvariantViolation, PropertyMap, PropertyValue, Resource, Urn};
