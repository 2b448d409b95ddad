//! Graph cloner
//!
//! Turns a resource's runtime object into a [`PropertyMap`] that can be
//! written to JSON or YAML, sent over RPC, or diffed, without any access to
//! the runtime afterwards.
//!
//! Dispatch is on the declared type of each value:
//!
//! | Declared type | Result |
//! |---------------|--------|
//! | resource | [`PropertyValue::Resource`] with the URN from the [`Context`] |
//! | null, bool, number, string | matching scalar |
//! | object, dynamic, map, class | [`PropertyValue::Object`] |
//! | array | [`PropertyValue::Array`], unrepresentable elements dropped |
//! | function | skipped (`Ok(None)`) |
//! | computed | [`PropertyValue::Output`] or [`PropertyValue::Computed`] placeholder |
//! | anything else | [`InvariantViolation::UnrecognizedType`] |
//!
//! The context must already hold a URN for every resource reachable from the
//! object being cloned. A missing entry means resources were walked out of
//! dependency order and is reported as an invariant violation.
//!
//! Elements of an array are cloned on behalf of the array itself, so a
//! computed element blocked on the enclosing resource is a
//! [`PropertyValue::Computed`] depending on that resource's URN.
//!
//! Resource references end the walk, but plain objects and arrays are
//! followed, so a container that contains itself is reported as
//! [`InvariantViolation::Cycle`] rather than recursed into.

use std::cell::RefCell;
use std::collections::BTreeSet;

use super::context::Context;
use super::error::InvariantViolation;
use super::heap::{ComputedInfo, ObjectGraph, ObjectId, PropertyBag, RuntimeObject, Type};
use super::property::{PropertyMap, PropertyValue};

/// Returns true if a computed value is an output of `owner`
///
/// That is the case when the value is a plain unresolved attribute (not an
/// expression) whose only blocking source is the owning resource itself.
pub fn is_output_property(owner: ObjectId, info: &ComputedInfo) -> bool {
    !info.expr && matches!(info.sources.as_slice(), [only] if *only == owner)
}

/// Zero-value placeholder for a value whose eventual type is `element`
///
/// Returns `None` for types that have no property representation.
pub fn zero_value(element: &Type) -> Option<PropertyValue> {
    match element {
        Type::Null => Some(PropertyValue::Null),
        Type::Bool => Some(PropertyValue::Bool(false)),
        Type::Number => Some(PropertyValue::Number(0.0)),
        Type::String => Some(PropertyValue::String(String::new())),
        Type::Array { .. } => Some(PropertyValue::array(Vec::new())),
        Type::Object
        | Type::Dynamic
        | Type::Map { .. }
        | Type::Class { .. }
        | Type::Resource { .. } => Some(PropertyValue::object(PropertyMap::new())),
        Type::Function | Type::Computed { .. } | Type::Opaque { .. } => None,
    }
}

/// Clones runtime objects into property values
pub struct Cloner<'a, G: ObjectGraph + ?Sized> {
    ctx: &'a Context,
    graph: &'a G,
    /// Containers currently being cloned, outermost first
    path: RefCell<Vec<ObjectId>>,
}

impl<'a, G: ObjectGraph + ?Sized> Cloner<'a, G> {
    pub fn new(ctx: &'a Context, graph: &'a G) -> Self {
        Self {
            ctx,
            graph,
            path: RefCell::new(Vec::new()),
        }
    }

    /// Clones the properties of a resource object
    pub fn clone_resource(&self, resource: ObjectId) -> Result<PropertyMap, InvariantViolation> {
        self.clone_object(resource, resource)
    }

    /// Clones the properties of any object-like value owned by `owner`
    pub fn clone_object(
        &self,
        owner: ObjectId,
        object: ObjectId,
    ) -> Result<PropertyMap, InvariantViolation> {
        let runtime = self.graph.require(object)?;
        let props = runtime
            .property_values()
            .ok_or_else(|| mismatch(owner, object, runtime))?;
        self.nested(owner, object, || self.clone_properties(owner, props))
    }

    /// Clones a property bag in stable key order, omitting unrepresentable values
    pub fn clone_properties(
        &self,
        owner: ObjectId,
        props: &PropertyBag,
    ) -> Result<PropertyMap, InvariantViolation> {
        let mut result = PropertyMap::new();
        for key in props.stable() {
            let Some(value) = props.get(key) else {
                continue;
            };
            match self.clone_property(owner, value)? {
                Some(cloned) => {
                    result.insert(key.into(), cloned);
                }
                None => {
                    tracing::debug!(owner = %owner, key, "skipping unrepresentable property");
                }
            }
        }
        Ok(result)
    }

    /// Clones a single value
    ///
    /// Returns `Ok(None)` when the value cannot be stored as a property
    /// (a function); callers drop it rather than fail.
    pub fn clone_property(
        &self,
        owner: ObjectId,
        object: ObjectId,
    ) -> Result<Option<PropertyValue>, InvariantViolation> {
        let runtime = self.graph.require(object)?;

        let value = match runtime.declared_type() {
            Type::Resource { .. } => {
                let urn = self
                    .ctx
                    .lookup(object)
                    .ok_or(InvariantViolation::MissingReference {
                        owner,
                        target: object,
                    })?;
                PropertyValue::Resource(urn.clone())
            }
            Type::Null => PropertyValue::Null,
            Type::Bool => PropertyValue::Bool(
                runtime
                    .bool_value()
                    .ok_or_else(|| mismatch(owner, object, runtime))?,
            ),
            Type::Number => PropertyValue::Number(
                runtime
                    .number_value()
                    .ok_or_else(|| mismatch(owner, object, runtime))?,
            ),
            Type::String => PropertyValue::String(
                runtime
                    .string_value()
                    .ok_or_else(|| mismatch(owner, object, runtime))?
                    .to_string(),
            ),
            Type::Object | Type::Dynamic | Type::Map { .. } | Type::Class { .. } => {
                PropertyValue::object(self.clone_object(owner, object)?)
            }
            Type::Array { .. } => {
                let items = runtime
                    .array_values()
                    .ok_or_else(|| mismatch(owner, object, runtime))?;
                // Elements are owned by the array, not the enclosing resource.
                let result = self.nested(owner, object, || {
                    let mut result = Vec::with_capacity(items.len());
                    for &item in items {
                        if let Some(cloned) = self.clone_property(object, item)? {
                            result.push(cloned);
                        }
                    }
                    Ok(result)
                })?;
                PropertyValue::array(result)
            }
            Type::Computed { element } => {
                let info = runtime
                    .computed_info()
                    .ok_or_else(|| mismatch(owner, object, runtime))?;
                self.clone_computed(owner, element, info)?
            }
            Type::Function => return Ok(None),
            ty @ Type::Opaque { .. } => {
                return Err(InvariantViolation::UnrecognizedType {
                    owner,
                    ty: ty.clone(),
                })
            }
        };

        Ok(Some(value))
    }

    /// Runs `f` with `object` on the container path, failing if it is already there
    fn nested<T>(
        &self,
        owner: ObjectId,
        object: ObjectId,
        f: impl FnOnce() -> Result<T, InvariantViolation>,
    ) -> Result<T, InvariantViolation> {
        if self.path.borrow().contains(&object) {
            return Err(InvariantViolation::Cycle { owner, object });
        }

        self.path.borrow_mut().push(object);
        let result = f();
        self.path.borrow_mut().pop();
        result
    }

    fn clone_computed(
        &self,
        owner: ObjectId,
        element: &Type,
        info: &ComputedInfo,
    ) -> Result<PropertyValue, InvariantViolation> {
        let output = is_output_property(owner, info);

        // Self references carry no information beyond "unknown until created".
        let mut depends_on = BTreeSet::new();
        if !output {
            for &source in info.sources.iter().filter(|&&s| s != owner) {
                let urn = self.ctx.lookup(source).ok_or(
                    InvariantViolation::MissingComputedReference {
                        owner,
                        dependency: source,
                    },
                )?;
                depends_on.insert(urn.clone());
            }
        }

        let zero = zero_value(element).ok_or_else(|| InvariantViolation::UnrecognizedType {
            owner,
            ty: Type::computed(element.clone()),
        })?;

        Ok(if output {
            PropertyValue::output(zero)
        } else {
            PropertyValue::computed(zero, depends_on)
        })
    }
}

fn mismatch(owner: ObjectId, object: ObjectId, runtime: &RuntimeObject) -> InvariantViolation {
    InvariantViolation::ValueMismatch {
        owner,
        object,
        ty: runtime.declared_type().clone(),
    }
}
