//! Domain models for resource snapshots
//!
//! Contains the object graph contract, the graph cloner, and the portable
//! resource model, without any I/O concerns.

mod clone;
mod context;
mod diff;
mod error;
mod heap;
mod id;
mod property;
mod resource;
mod snapshot;
mod unique;

pub use clone::{is_output_property, zero_value, Cloner};
pub use context::Context;
pub use diff::{diff, ObjectDiff, ValueDiff};
pub use error::InvariantViolation;
pub use heap::{ComputedInfo, Heap, ObjectGraph, ObjectId, PropertyBag, RuntimeObject, Type, Value};
pub use id::{ResourceId, TypeToken, Urn};
pub use property::{deep_clone_map, Computed, Output, PropertyKey, PropertyMap, PropertyValue, Shared};
pub use resource::Resource;
pub use snapshot::{take_snapshot, ResourceDecl, SnapshotError, Snapshotter};
pub use unique::{new_unique_hex, new_unique_hex_id, EntropyError};
