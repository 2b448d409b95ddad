//! Serializable property values
//!
//! [`PropertyValue`] is the portable form of a runtime value: it never holds
//! live handles (resources become URNs) and every variant encodes directly
//! with serde as `{"kind": ..., "value": ...}`.
//!
//! Arrays and objects sit behind a [`Shared`] cell, so cloning a value is
//! shallow: a clone and its source observe each other's nested mutations.
//! Use [`PropertyValue::deep_clone`] for a fully independent tree.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use super::id::Urn;

/// Name of a property
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyKey(String);

impl PropertyKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropertyKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::borrow::Borrow<str> for PropertyKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Property values keyed by name, iterated in stable (lexicographic) order
pub type PropertyMap = BTreeMap<PropertyKey, PropertyValue>;

/// Single-threaded shared cell for nested arrays and objects
#[derive(Debug, Default)]
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        RefCell::borrow(&self.0)
    }

    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        RefCell::borrow_mut(&self.0)
    }

    /// Returns true if both handles point at the same cell
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: PartialEq> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.borrow() == *other.borrow()
    }
}

impl<T: Serialize> Serialize for Shared<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.borrow().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Shared<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Shared::new)
    }
}

/// A value not yet known, blocked on other resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Computed {
    /// Zero-value placeholder of the eventual type
    pub element: Box<PropertyValue>,

    /// URNs of the resources this value waits on (never its owner)
    #[serde(default)]
    pub depends_on: BTreeSet<Urn>,
}

/// A value not yet known, blocked only on its owning resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    /// Zero-value placeholder of the eventual type
    pub element: Box<PropertyValue>,
}

/// A serializable property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Shared<Vec<PropertyValue>>),
    Object(Shared<PropertyMap>),
    /// Reference to another resource by URN
    Resource(Urn),
    Computed(Computed),
    Output(Output),
}

impl PropertyValue {
    pub fn array(items: Vec<PropertyValue>) -> Self {
        PropertyValue::Array(Shared::new(items))
    }

    pub fn object(props: PropertyMap) -> Self {
        PropertyValue::Object(Shared::new(props))
    }

    pub fn resource(urn: Urn) -> Self {
        PropertyValue::Resource(urn)
    }

    /// Wraps a placeholder as a computed value depending on `depends_on`
    pub fn computed(element: PropertyValue, depends_on: BTreeSet<Urn>) -> Self {
        PropertyValue::Computed(Computed {
            element: Box::new(element),
            depends_on,
        })
    }

    /// Wraps a placeholder as an output value
    pub fn output(element: PropertyValue) -> Self {
        PropertyValue::Output(Output {
            element: Box::new(element),
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Shared<Vec<PropertyValue>>> {
        match self {
            PropertyValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Shared<PropertyMap>> {
        match self {
            PropertyValue::Object(props) => Some(props),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&Urn> {
        match self {
            PropertyValue::Resource(urn) => Some(urn),
            _ => None,
        }
    }

    pub fn as_computed(&self) -> Option<&Computed> {
        match self {
            PropertyValue::Computed(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_output(&self) -> Option<&Output> {
        match self {
            PropertyValue::Output(o) => Some(o),
            _ => None,
        }
    }

    /// True for values not yet known (computed or output)
    pub fn is_unknown(&self) -> bool {
        matches!(self, PropertyValue::Computed(_) | PropertyValue::Output(_))
    }

    /// Short name of the variant
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Null => "null",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Number(_) => "number",
            PropertyValue::String(_) => "string",
            PropertyValue::Array(_) => "array",
            PropertyValue::Object(_) => "object",
            PropertyValue::Resource(_) => "resource",
            PropertyValue::Computed(_) => "computed",
            PropertyValue::Output(_) => "output",
        }
    }

    /// Copies the whole tree so that nothing is shared with `self`
    pub fn deep_clone(&self) -> Self {
        match self {
            PropertyValue::Array(items) => {
                PropertyValue::array(items.borrow().iter().map(Self::deep_clone).collect())
            }
            PropertyValue::Object(props) => PropertyValue::object(deep_clone_map(&props.borrow())),
            PropertyValue::Computed(c) => {
                PropertyValue::computed(c.element.deep_clone(), c.depends_on.clone())
            }
            PropertyValue::Output(o) => PropertyValue::output(o.element.deep_clone()),
            other => other.clone(),
        }
    }
}

/// Copies a property map so that nothing nested is shared with `props`
pub fn deep_clone_map(props: &PropertyMap) -> PropertyMap {
    props
        .iter()
        .map(|(k, v)| (k.clone(), v.deep_clone()))
        .collect()
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<Urn> for PropertyValue {
    fn from(value: Urn) -> Self {
        PropertyValue::Resource(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> PropertyMap {
        let mut inner = PropertyMap::new();
        inner.insert("port".into(), 80.0.into());

        let mut props = PropertyMap::new();
        props.insert("name".into(), "web".into());
        props.insert("config".into(), PropertyValue::object(inner));
        props
    }

    #[test]
    fn shared_cell_borrows_through_handles() {
        let cell = Shared::new(sample_map());
        let other = cell.clone();

        other
            .borrow_mut()
            .insert("zone".into(), PropertyValue::from("a"));

        let props: std::cell::Ref<'_, PropertyMap> = cell.borrow();
        assert_eq!(props.get("zone"), Some(&PropertyValue::from("a")));
        assert_eq!(props.len(), 3);
    }

    #[test]
    fn keys_iterate_lexicographically() {
        let mut props = PropertyMap::new();
        props.insert("zone".into(), PropertyValue::Null);
        props.insert("Ami".into(), PropertyValue::Null);
        props.insert("ami".into(), PropertyValue::Null);

        let keys: Vec<_> = props.keys().map(PropertyKey::as_str).collect();
        assert_eq!(keys, vec!["Ami", "ami", "zone"]);
    }

    #[test]
    fn clone_shares_nested_objects() {
        let original = PropertyValue::object(sample_map());
        let copy = original.clone();

        copy.as_object()
            .unwrap()
            .borrow_mut()
            .insert("extra".into(), true.into());

        assert!(original.as_object().unwrap().borrow().contains_key("extra"));
        assert!(original.as_object().unwrap().ptr_eq(copy.as_object().unwrap()));
    }

    #[test]
    fn deep_clone_is_independent() {
        let original = PropertyValue::object(sample_map());
        let copy = original.deep_clone();

        copy.as_object()
            .unwrap()
            .borrow_mut()
            .insert("extra".into(), true.into());

        assert!(!original.as_object().unwrap().borrow().contains_key("extra"));
        assert!(!original.as_object().unwrap().ptr_eq(copy.as_object().unwrap()));
    }

    #[test]
    fn equality_compares_contents() {
        let a = PropertyValue::array(vec![1.0.into(), "x".into()]);
        let b = PropertyValue::array(vec![1.0.into(), "x".into()]);
        assert_eq!(a, b);
        assert_ne!(a, PropertyValue::array(vec![]));
    }

    #[test]
    fn json_encoding_is_tagged() {
        let value = PropertyValue::computed(
            PropertyValue::String(String::new()),
            BTreeSet::from([Urn::from("c-1")]),
        );

        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "computed",
                "value": {
                    "element": {"kind": "string", "value": ""},
                    "depends_on": ["c-1"]
                }
            })
        );
    }

    #[test]
    fn json_roundtrip_of_nested_tree() {
        let mut props = sample_map();
        props.insert("owner".into(), Urn::from("urn:rsnap:dev::t::a").into());
        props.insert("id".into(), PropertyValue::output(PropertyValue::String(String::new())));
        props.insert("none".into(), PropertyValue::Null);
        let value = PropertyValue::object(props);

        let json = serde_json::to_string(&value).unwrap();
        let parsed: PropertyValue = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn yaml_roundtrip_of_nested_tree() {
        let value = PropertyValue::array(vec![
            PropertyValue::Null,
            false.into(),
            PropertyValue::object(sample_map()),
        ]);

        let yaml = serde_yaml::to_string(&value).unwrap();
        let parsed: PropertyValue = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn unknown_values() {
        assert!(PropertyValue::output(PropertyValue::Null).is_unknown());
        assert!(PropertyValue::computed(PropertyValue::Null, BTreeSet::new()).is_unknown());
        assert!(!PropertyValue::Null.is_unknown());
    }
}
