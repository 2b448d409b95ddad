//! Identity types for resources
//!
//! - [`ResourceId`]: opaque handle assigned by a resource provider
//! - [`Urn`]: stable, human-meaningful name used in place of live references
//! - [`TypeToken`]: fully-qualified resource type (e.g. `aws:ec2/instance:Instance`)
//!
//! URNs minted by this crate have the form `urn:rsnap:{namespace}::{type}::{name}`,
//! but any string is accepted as a URN; consumers treat them as opaque.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix for URNs minted by [`Urn::new`]
const URN_PREFIX: &str = "urn:rsnap:";

/// Separator between URN segments
const URN_SEPARATOR: &str = "::";

/// Provider-assigned resource identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty ID stands for "not assigned yet"
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

/// Stable resource name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Urn(String);

impl Urn {
    /// Mints a URN for a named resource of the given type within a namespace
    pub fn new(namespace: &str, ty: &TypeToken, name: &str) -> Self {
        Self(format!(
            "{URN_PREFIX}{namespace}{URN_SEPARATOR}{ty}{URN_SEPARATOR}{name}"
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty URN stands for "not assigned yet"
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the trailing name segment (the whole URN if it has no segments)
    pub fn name(&self) -> &str {
        self.0
            .rsplit_once(URN_SEPARATOR)
            .map(|(_, name)| name)
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Urn {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Urn {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<Urn> for String {
    fn from(urn: Urn) -> Self {
        urn.0
    }
}

/// Fully-qualified type token
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeToken(String);

impl TypeToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TypeToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}
