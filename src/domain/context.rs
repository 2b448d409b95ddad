//! Dependency context
//!
//! Maps runtime object identities to the URNs they were assigned. It is
//! filled by a dependency-ordered walk before (or while) resources are
//! cloned; the cloner only reads it.

use std::collections::HashMap;

use super::heap::ObjectId;
use super::id::Urn;

#[derive(Debug, Clone, Default)]
pub struct Context {
    obj_urn: HashMap<ObjectId, Urn>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the URN recorded for an object, if any
    pub fn lookup(&self, object: ObjectId) -> Option<&Urn> {
        self.obj_urn.get(&object)
    }

    /// Records the URN of an object, returning the previous one
    pub fn insert(&mut self, object: ObjectId, urn: Urn) -> Option<Urn> {
        self.obj_urn.insert(object, urn)
    }

    pub fn contains(&self, object: ObjectId) -> bool {
        self.obj_urn.contains_key(&object)
    }

    pub fn len(&self) -> usize {
        self.obj_urn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obj_urn.is_empty()
    }
}

impl FromIterator<(ObjectId, Urn)> for Context {
    fn from_iter<I: IntoIterator<Item = (ObjectId, Urn)>>(iter: I) -> Self {
        Self {
            obj_urn: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_after_insert() {
        let mut ctx = Context::new();
        assert!(ctx.lookup(ObjectId(1)).is_none());

        ctx.insert(ObjectId(1), Urn::from("a"));
        assert_eq!(ctx.lookup(ObjectId(1)), Some(&Urn::from("a")));
        assert!(ctx.contains(ObjectId(1)));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn collects_from_pairs() {
        let ctx: Context = [(ObjectId(0), Urn::from("a")), (ObjectId(3), Urn::from("b"))]
            .into_iter()
            .collect();
        assert_eq!(ctx.lookup(ObjectId(3)), Some(&Urn::from("b")));
        assert!(!ctx.is_empty());
    }
}
