//! Snapshot driver
//!
//! Walks resources in their declared order, which must already respect
//! dependencies: each resource gets its URN recorded in the [`Context`]
//! before it is cloned, so references to earlier resources resolve and a
//! reference to a later one fails as an out-of-order walk.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::context::Context;
use super::error::InvariantViolation;
use super::heap::{ObjectGraph, ObjectId, Type};
use super::id::Urn;
use super::resource::Resource;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error("Duplicate resource URN: {0}")]
    DuplicateUrn(Urn),

    #[error("Resource object {0} declared more than once")]
    DuplicateObject(ObjectId),
}

/// A resource to snapshot: its runtime object and its name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDecl {
    pub object: ObjectId,
    pub name: String,
}

impl ResourceDecl {
    pub fn new(object: ObjectId, name: impl Into<String>) -> Self {
        Self {
            object,
            name: name.into(),
        }
    }
}

/// Incrementally snapshots resources of one object graph
pub struct Snapshotter<'a, G: ObjectGraph + ?Sized> {
    graph: &'a G,
    namespace: String,
    ctx: Context,
    urns: HashSet<Urn>,
    resources: Vec<Resource>,
}

impl<'a, G: ObjectGraph + ?Sized> Snapshotter<'a, G> {
    pub fn new(graph: &'a G, namespace: impl Into<String>) -> Self {
        Self {
            graph,
            namespace: namespace.into(),
            ctx: Context::new(),
            urns: HashSet::new(),
            resources: Vec::new(),
        }
    }

    /// Snapshots the next resource in dependency order
    pub fn add(&mut self, decl: &ResourceDecl) -> Result<&Resource, SnapshotError> {
        let token = match self.graph.require(decl.object)?.declared_type() {
            Type::Resource { token } => token.clone(),
            other => {
                return Err(InvariantViolation::NotAResource {
                    object: decl.object,
                    ty: other.clone(),
                }
                .into())
            }
        };

        if self.ctx.contains(decl.object) {
            return Err(SnapshotError::DuplicateObject(decl.object));
        }

        let urn = Urn::new(&self.namespace, &token, &decl.name);
        if !self.urns.insert(urn.clone()) {
            return Err(SnapshotError::DuplicateUrn(urn));
        }

        self.ctx.insert(decl.object, urn.clone());

        let mut resource = Resource::from_object(&self.ctx, self.graph, decl.object)?;
        resource.set_urn(urn)?;
        tracing::debug!(urn = ?resource.urn(), inputs = resource.inputs().len(), "snapshotted resource");

        let index = self.resources.len();
        self.resources.push(resource);
        Ok(&self.resources[index])
    }

    /// The context built so far
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn finish(self) -> Vec<Resource> {
        self.resources
    }
}

/// Snapshots every declared resource, in order
pub fn take_snapshot<G: ObjectGraph + ?Sized>(
    graph: &G,
    namespace: &str,
    decls: &[ResourceDecl],
) -> Result<Vec<Resource>, SnapshotError> {
    let mut snapshotter = Snapshotter::new(graph, namespace);
    for decl in decls {
        snapshotter.add(decl)?;
    }
    Ok(snapshotter.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::heap::Heap;
    use crate::domain::property::PropertyValue;
    use std::collections::BTreeSet;

    const BUCKET: &str = "aws:s3/bucket:Bucket";
    const OBJECT: &str = "aws:s3/object:Object";

    /// A bucket and an object stored in it, whose etag waits on the bucket
    fn two_resources() -> (Heap, ObjectId, ObjectId) {
        let mut heap = Heap::new();
        let name = heap.string("logs");
        let bucket = heap.resource(BUCKET, [("name", name)]);
        let arn = heap.computed(Type::String, false, vec![bucket]);
        heap.set_property(bucket, "arn", arn).unwrap();

        let key = heap.string("index.html");
        let object = heap.resource(OBJECT, [("bucket", bucket), ("key", key)]);
        let etag = heap.computed(Type::String, true, vec![bucket, object]);
        heap.set_property(object, "etag", etag).unwrap();

        (heap, bucket, object)
    }

    #[test]
    fn snapshots_in_dependency_order() {
        let (heap, bucket, object) = two_resources();
        let decls = [ResourceDecl::new(bucket, "logs"), ResourceDecl::new(object, "index")];

        let resources = take_snapshot(&heap, "dev", &decls).unwrap();
        assert_eq!(resources.len(), 2);

        let bucket_urn = Urn::from("urn:rsnap:dev::aws:s3/bucket:Bucket::logs");
        assert_eq!(resources[0].urn(), Some(&bucket_urn));
        assert_eq!(
            resources[0].inputs()["arn"],
            PropertyValue::output(PropertyValue::from(""))
        );

        let inputs = resources[1].inputs();
        assert_eq!(inputs["bucket"], PropertyValue::Resource(bucket_urn.clone()));
        assert_eq!(
            inputs["etag"],
            PropertyValue::computed(PropertyValue::from(""), BTreeSet::from([bucket_urn]))
        );
        assert!(!resources[1].has_id());
    }

    #[test]
    fn out_of_order_walk_is_fatal() {
        let (heap, bucket, object) = two_resources();
        let decls = [ResourceDecl::new(object, "index"), ResourceDecl::new(bucket, "logs")];

        let err = take_snapshot(&heap, "dev", &decls).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::Invariant(InvariantViolation::MissingReference { owner, target })
                if owner == object && target == bucket
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut heap = Heap::new();
        let a = heap.resource(BUCKET, Vec::<(&str, ObjectId)>::new());
        let b = heap.resource(BUCKET, Vec::<(&str, ObjectId)>::new());

        let decls = [ResourceDecl::new(a, "x"), ResourceDecl::new(b, "x")];
        let err = take_snapshot(&heap, "dev", &decls).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateUrn(_)));
    }

    #[test]
    fn duplicate_objects_are_rejected() {
        let mut heap = Heap::new();
        let a = heap.resource(BUCKET, Vec::<(&str, ObjectId)>::new());

        let decls = [ResourceDecl::new(a, "x"), ResourceDecl::new(a, "y")];
        let err = take_snapshot(&heap, "dev", &decls).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateObject(id) if id == a));
    }

    #[test]
    fn non_resource_declaration_is_rejected() {
        let mut heap = Heap::new();
        let s = heap.string("nope");

        let err = take_snapshot(&heap, "dev", &[ResourceDecl::new(s, "s")]).unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::Invariant(InvariantViolation::NotAResource { .. })
        ));
    }

    #[test]
    fn context_tracks_added_resources() {
        let (heap, bucket, _) = two_resources();
        let mut snapshotter = Snapshotter::new(&heap, "dev");

        snapshotter.add(&ResourceDecl::new(bucket, "logs")).unwrap();
        assert!(snapshotter.context().contains(bucket));
        assert_eq!(snapshotter.finish().len(), 1);
    }
}
