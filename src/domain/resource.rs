//! Resource domain model
//!
//! A [`Resource`] is the portable state of one resource: its provider ID,
//! URN, type, and the input/output property maps. ID and URN start blank
//! and are each assigned exactly once. An empty ID or URN is the same as a
//! blank one, wherever it comes from.

use serde::{Deserialize, Deserializer, Serialize};

use super::clone::Cloner;
use super::context::Context;
use super::error::InvariantViolation;
use super::heap::{ObjectGraph, ObjectId, Type};
use super::id::{ResourceId, TypeToken, Urn};
use super::property::PropertyMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Assigned by the resource provider once created
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_id"
    )]
    id: Option<ResourceId>,

    /// Assigned by the orchestration layer
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_urn"
    )]
    urn: Option<Urn>,

    #[serde(rename = "type")]
    ty: TypeToken,

    /// Input properties, as specified by the program
    #[serde(default)]
    inputs: PropertyMap,

    /// Output properties, as reported by the provider
    #[serde(default)]
    outputs: PropertyMap,
}

impl Resource {
    /// Creates a resource; absent property maps default to empty
    pub fn new(
        id: Option<ResourceId>,
        urn: Option<Urn>,
        ty: TypeToken,
        inputs: Option<PropertyMap>,
        outputs: Option<PropertyMap>,
    ) -> Self {
        Self {
            id: id.filter(|id| !id.is_empty()),
            urn: urn.filter(|urn| !urn.is_empty()),
            ty,
            inputs: inputs.unwrap_or_default(),
            outputs: outputs.unwrap_or_default(),
        }
    }

    /// Creates a resource from its runtime object
    ///
    /// The context must hold URNs for every resource the object refers to.
    /// ID and URN are left blank.
    pub fn from_object<G: ObjectGraph + ?Sized>(
        ctx: &Context,
        graph: &G,
        object: ObjectId,
    ) -> Result<Self, InvariantViolation> {
        let token = match graph.require(object)?.declared_type() {
            Type::Resource { token } => token.clone(),
            other => {
                return Err(InvariantViolation::NotAResource {
                    object,
                    ty: other.clone(),
                })
            }
        };

        let inputs = Cloner::new(ctx, graph).clone_resource(object)?;
        Ok(Self::new(None, None, token, Some(inputs), None))
    }

    pub fn id(&self) -> Option<&ResourceId> {
        self.id.as_ref()
    }

    pub fn urn(&self) -> Option<&Urn> {
        self.urn.as_ref()
    }

    pub fn resource_type(&self) -> &TypeToken {
        &self.ty
    }

    pub fn inputs(&self) -> &PropertyMap {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut PropertyMap {
        &mut self.inputs
    }

    pub fn outputs(&self) -> &PropertyMap {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut PropertyMap {
        &mut self.outputs
    }

    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// Assigns the provider ID; fails if one is already assigned
    pub fn set_id(&mut self, id: ResourceId) -> Result<(), InvariantViolation> {
        if let Some(current) = &self.id {
            return Err(InvariantViolation::AlreadyAssigned {
                field: "id",
                current: current.to_string(),
            });
        }
        tracing::trace!(id = %id, urn = ?self.urn, "assigning resource id");
        self.id = Some(id).filter(|id| !id.is_empty());
        Ok(())
    }

    pub fn has_urn(&self) -> bool {
        self.urn.is_some()
    }

    /// Assigns the URN; fails if one is already assigned
    pub fn set_urn(&mut self, urn: Urn) -> Result<(), InvariantViolation> {
        if let Some(current) = &self.urn {
            return Err(InvariantViolation::AlreadyAssigned {
                field: "urn",
                current: current.to_string(),
            });
        }
        tracing::trace!(urn = %urn, "assigning resource urn");
        self.urn = Some(urn).filter(|urn| !urn.is_empty());
        Ok(())
    }

    /// Copies every output property of `src` into this resource
    pub fn set_outputs_from(&mut self, src: &Resource) {
        self.outputs
            .extend(src.outputs.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Clones the resource with independent top-level property maps
    ///
    /// Nested arrays and objects stay shared with `self`, so mutations deep
    /// inside a property are visible through both.
    pub fn shallow_clone(&self) -> Self {
        self.clone()
    }
}

fn blank_id<'de, D>(deserializer: D) -> Result<Option<ResourceId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ResourceId>::deserialize(deserializer)?.filter(|id| !id.is_empty()))
}

fn blank_urn<'de, D>(deserializer: D) -> Result<Option<Urn>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Urn>::deserialize(deserializer)?.filter(|urn| !urn.is_empty()))
}
