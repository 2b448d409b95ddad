//! Invariant violations
//!
//! These errors mean a caller broke a sequencing or typing contract (an
//! identity assigned twice, a dependency walked out of order, an object
//! graph handing over a value it promised not to). They are never expected
//! under correct use and must not be retried; callers abort the current
//! operation and surface the message.

use thiserror::Error;

use super::heap::{ObjectId, Type};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum InvariantViolation {
    #[error("Resource {field} already assigned (current value '{current}')")]
    AlreadyAssigned {
        field: &'static str,
        current: String,
    },

    #[error("Missing object reference for {target} from resource {owner}; possible out of order dependency walk")]
    MissingReference { owner: ObjectId, target: ObjectId },

    #[error("Missing computed reference from resource {owner} to {dependency}; possible out of order dependency walk")]
    MissingComputedReference { owner: ObjectId, dependency: ObjectId },

    #[error("Unrecognized resource property object type '{ty}' in resource {owner}")]
    UnrecognizedType { owner: ObjectId, ty: Type },

    #[error("Object {object} in resource {owner} does not carry a value of its declared type '{ty}'")]
    ValueMismatch {
        owner: ObjectId,
        object: ObjectId,
        ty: Type,
    },

    #[error("Object {object} in resource {owner} contains itself; resource properties must form a tree")]
    Cycle { owner: ObjectId, object: ObjectId },

    #[error("Object {0} does not exist in the object graph")]
    UnknownObject(ObjectId),

    #[error("Object {object} has type '{ty}', which is not a resource type")]
    NotAResource { object: ObjectId, ty: Type },
}
