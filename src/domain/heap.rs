//! Runtime object graph
//!
//! The evaluator hands over its heap through the narrow, read-only
//! [`ObjectGraph`] contract: every object has a declared [`Type`] and a
//! [`Value`] payload, and is identified by its [`ObjectId`] (an arena index,
//! standing in for reference identity).
//!
//! [`Heap`] is the arena implementation used by the snapshot driver and by
//! heap dumps read from disk.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::InvariantViolation;
use super::id::TypeToken;

/// Identity of a runtime object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declared type of a runtime object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    Null,
    Bool,
    Number,
    String,
    Object,
    Dynamic,
    Array { element: Box<Type> },
    Map { element: Box<Type> },
    Class { token: TypeToken },
    Resource { token: TypeToken },
    Function,
    /// A value whose eventual type is `element` but which is not yet known
    Computed { element: Box<Type> },
    /// An evaluator-internal type with no property representation
    Opaque { name: String },
}

impl Type {
    pub fn array(element: Type) -> Self {
        Type::Array {
            element: Box::new(element),
        }
    }

    pub fn map(element: Type) -> Self {
        Type::Map {
            element: Box::new(element),
        }
    }

    pub fn computed(element: Type) -> Self {
        Type::Computed {
            element: Box::new(element),
        }
    }

    pub fn is_resource(&self) -> bool {
        matches!(self, Type::Resource { .. })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Null => f.write_str("null"),
            Type::Bool => f.write_str("bool"),
            Type::Number => f.write_str("number"),
            Type::String => f.write_str("string"),
            Type::Object => f.write_str("object"),
            Type::Dynamic => f.write_str("dynamic"),
            Type::Array { element } => write!(f, "{}[]", element),
            Type::Map { element } => write!(f, "map[string]{}", element),
            Type::Class { token } | Type::Resource { token } => write!(f, "{}", token),
            Type::Function => f.write_str("function"),
            Type::Computed { element } => write!(f, "computed<{}>", element),
            Type::Opaque { name } => f.write_str(name),
        }
    }
}

/// Properties of an object, kept in declaration order
///
/// Cloning never depends on declaration order: [`PropertyBag::stable`]
/// re-derives the lexicographic key order on every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(IndexMap<String, ObjectId>);

impl PropertyBag {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Sets a property, keeping the original position of an existing key
    pub fn insert(&mut self, key: impl Into<String>, value: ObjectId) -> Option<ObjectId> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<ObjectId> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, ObjectId)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Returns the keys in stable (lexicographic) order
    pub fn stable(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.0.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl<K: Into<String>> FromIterator<(K, ObjectId)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, ObjectId)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// What a computed value is waiting on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedInfo {
    /// True when the value is produced by an expression rather than being a
    /// plain unresolved attribute
    #[serde(default)]
    pub expr: bool,

    /// Objects whose resolution this value is blocked on, in evaluation order
    #[serde(default)]
    pub sources: Vec<ObjectId>,
}

/// Payload of a runtime object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Objects, maps, class instances, and resources
    Object(PropertyBag),
    Array(Vec<ObjectId>),
    Computed(ComputedInfo),
    Function(String),
    Opaque,
}

/// A runtime object: declared type plus payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeObject {
    #[serde(rename = "type")]
    pub ty: Type,
    pub value: Value,
}

impl RuntimeObject {
    pub fn new(ty: Type, value: Value) -> Self {
        Self { ty, value }
    }

    pub fn declared_type(&self) -> &Type {
        &self.ty
    }

    pub fn bool_value(&self) -> Option<bool> {
        match self.value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn number_value(&self) -> Option<f64> {
        match self.value {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn string_value(&self) -> Option<&str> {
        match &self.value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn property_values(&self) -> Option<&PropertyBag> {
        match &self.value {
            Value::Object(props) => Some(props),
            _ => None,
        }
    }

    pub fn array_values(&self) -> Option<&[ObjectId]> {
        match &self.value {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn computed_info(&self) -> Option<&ComputedInfo> {
        match &self.value {
            Value::Computed(info) => Some(info),
            _ => None,
        }
    }

    /// Every object this one refers to
    fn references(&self) -> Vec<ObjectId> {
        match &self.value {
            Value::Object(props) => props.iter().map(|(_, v)| v).collect(),
            Value::Array(items) => items.clone(),
            Value::Computed(info) => info.sources.clone(),
            _ => vec![],
        }
    }
}

/// Read-only access to an evaluated object graph
pub trait ObjectGraph {
    /// Returns the object with the given identity
    fn get(&self, id: ObjectId) -> Option<&RuntimeObject>;

    /// Like [`ObjectGraph::get`], but a dangling identity is an invariant violation
    fn require(&self, id: ObjectId) -> Result<&RuntimeObject, InvariantViolation> {
        self.get(id).ok_or(InvariantViolation::UnknownObject(id))
    }
}

/// Append-only arena of runtime objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Heap {
    objects: Vec<RuntimeObject>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Allocates an object and returns its identity
    pub fn alloc(&mut self, ty: Type, value: Value) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(RuntimeObject::new(ty, value));
        id
    }

    pub fn null(&mut self) -> ObjectId {
        self.alloc(Type::Null, Value::Null)
    }

    pub fn bool(&mut self, b: bool) -> ObjectId {
        self.alloc(Type::Bool, Value::Bool(b))
    }

    pub fn number(&mut self, n: f64) -> ObjectId {
        self.alloc(Type::Number, Value::Number(n))
    }

    pub fn string(&mut self, s: impl Into<String>) -> ObjectId {
        self.alloc(Type::String, Value::String(s.into()))
    }

    /// Allocates an object literal
    pub fn object<K: Into<String>>(
        &mut self,
        props: impl IntoIterator<Item = (K, ObjectId)>,
    ) -> ObjectId {
        self.alloc(Type::Object, Value::Object(props.into_iter().collect()))
    }

    pub fn array(&mut self, element: Type, items: Vec<ObjectId>) -> ObjectId {
        self.alloc(Type::array(element), Value::Array(items))
    }

    pub fn map<K: Into<String>>(
        &mut self,
        element: Type,
        entries: impl IntoIterator<Item = (K, ObjectId)>,
    ) -> ObjectId {
        self.alloc(Type::map(element), Value::Object(entries.into_iter().collect()))
    }

    /// Allocates an instance of a (non-resource) class
    pub fn instance<K: Into<String>>(
        &mut self,
        class: impl Into<TypeToken>,
        props: impl IntoIterator<Item = (K, ObjectId)>,
    ) -> ObjectId {
        self.alloc(
            Type::Class {
                token: class.into(),
            },
            Value::Object(props.into_iter().collect()),
        )
    }

    /// Allocates a resource object
    pub fn resource<K: Into<String>>(
        &mut self,
        token: impl Into<TypeToken>,
        props: impl IntoIterator<Item = (K, ObjectId)>,
    ) -> ObjectId {
        self.alloc(
            Type::Resource {
                token: token.into(),
            },
            Value::Object(props.into_iter().collect()),
        )
    }

    pub fn function(&mut self, name: impl Into<String>) -> ObjectId {
        self.alloc(Type::Function, Value::Function(name.into()))
    }

    /// Allocates a not-yet-known value of eventual type `element`
    pub fn computed(&mut self, element: Type, expr: bool, sources: Vec<ObjectId>) -> ObjectId {
        self.alloc(
            Type::computed(element),
            Value::Computed(ComputedInfo { expr, sources }),
        )
    }

    pub fn opaque(&mut self, name: impl Into<String>) -> ObjectId {
        self.alloc(Type::Opaque { name: name.into() }, Value::Opaque)
    }

    /// Sets a property on an already allocated object-like value
    ///
    /// Used to wire up values that refer back to their owner, such as a
    /// resource's own unresolved attributes.
    pub fn set_property(
        &mut self,
        target: ObjectId,
        key: impl Into<String>,
        value: ObjectId,
    ) -> Result<(), InvariantViolation> {
        let object = self
            .objects
            .get_mut(target.0)
            .ok_or(InvariantViolation::UnknownObject(target))?;

        match &mut object.value {
            Value::Object(props) => {
                props.insert(key, value);
                Ok(())
            }
            _ => Err(InvariantViolation::ValueMismatch {
                owner: target,
                object: target,
                ty: object.ty.clone(),
            }),
        }
    }

    /// Checks that every identity referenced from the heap exists
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        for object in &self.objects {
            for reference in object.references() {
                self.require(reference)?;
            }
        }
        Ok(())
    }
}

impl ObjectGraph for Heap {
    fn get(&self, id: ObjectId) -> Option<&RuntimeObject> {
        self.objects.get(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_assigns_sequential_ids() {
        let mut heap = Heap::new();
        let a = heap.null();
        let b = heap.number(1.0);

        assert_eq!(a, ObjectId(0));
        assert_eq!(b, ObjectId(1));
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn stable_order_is_lexicographic() {
        let mut heap = Heap::new();
        let v = heap.null();
        let obj = heap.object([("zeta", v), ("alpha", v), ("Mid", v)]);

        let props = heap.require(obj).unwrap().property_values().unwrap();
        let declared: Vec<_> = props.iter().map(|(k, _)| k).collect();
        assert_eq!(declared, vec!["zeta", "alpha", "Mid"]);
        assert_eq!(props.stable(), vec!["Mid", "alpha", "zeta"]);
    }

    #[test]
    fn stable_order_reflects_later_insertions() {
        let mut heap = Heap::new();
        let v = heap.null();
        let obj = heap.object([("b", v)]);
        assert_eq!(heap.require(obj).unwrap().property_values().unwrap().stable(), vec!["b"]);

        heap.set_property(obj, "a", v).unwrap();
        assert_eq!(
            heap.require(obj).unwrap().property_values().unwrap().stable(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn accessors_reject_mismatched_payloads() {
        let mut heap = Heap::new();
        let s = heap.string("x");
        let obj = heap.require(s).unwrap();

        assert_eq!(obj.string_value(), Some("x"));
        assert_eq!(obj.bool_value(), None);
        assert_eq!(obj.number_value(), None);
        assert!(obj.property_values().is_none());
        assert!(obj.array_values().is_none());
        assert!(obj.computed_info().is_none());
    }

    #[test]
    fn set_property_on_scalar_fails() {
        let mut heap = Heap::new();
        let n = heap.number(3.0);
        let v = heap.null();

        let result = heap.set_property(n, "x", v);
        assert!(matches!(result, Err(InvariantViolation::ValueMismatch { .. })));
    }

    #[test]
    fn unknown_object_is_reported() {
        let heap = Heap::new();
        assert_eq!(
            heap.require(ObjectId(7)).unwrap_err(),
            InvariantViolation::UnknownObject(ObjectId(7))
        );
    }

    #[test]
    fn validate_finds_dangling_references() {
        let mut heap = Heap::new();
        let v = heap.null();
        heap.array(Type::Null, vec![v, ObjectId(42)]);

        assert_eq!(
            heap.validate().unwrap_err(),
            InvariantViolation::UnknownObject(ObjectId(42))
        );
    }

    #[test]
    fn type_display() {
        assert_eq!(Type::array(Type::Number).to_string(), "number[]");
        assert_eq!(Type::map(Type::String).to_string(), "map[string]string");
        assert_eq!(Type::computed(Type::Bool).to_string(), "computed<bool>");
        assert_eq!(
            Type::Resource {
                token: TypeToken::from("aws:s3:Bucket")
            }
            .to_string(),
            "aws:s3:Bucket"
        );
    }

    #[test]
    fn heap_deserializes_from_json() {
        let json = r#"[
            {"type": {"kind": "string"}, "value": {"kind": "string", "value": "hi"}},
            {"type": {"kind": "resource", "token": "t:m:R"},
             "value": {"kind": "object", "value": {"name": 0}}},
            {"type": {"kind": "computed", "element": {"kind": "number"}},
             "value": {"kind": "computed", "value": {"sources": [1]}}}
        ]"#;

        let heap: Heap = serde_json::from_str(json).unwrap();
        assert_eq!(heap.len(), 3);
        heap.validate().unwrap();

        let res = heap.require(ObjectId(1)).unwrap();
        assert!(res.declared_type().is_resource());
        assert_eq!(res.property_values().unwrap().get("name"), Some(ObjectId(0)));

        let comp = heap.require(ObjectId(2)).unwrap().computed_info().unwrap();
        assert!(!comp.expr);
        assert_eq!(comp.sources, vec![ObjectId(1)]);
    }
}
