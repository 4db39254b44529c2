//! # Core Domain Entities
//!
//! Defines the catalog entities offered by the live-patching filter form.
//!
//! ## Clusters
//!
//! - **Scoping**: `Client`, `Product` (the entity a filter is scoped to)
//! - **Kernels**: `Kernel` (live-patchable kernel versions for a scope)
//! - **Form variants**: `Template`, `KernelScope`

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Stable identifier of a catalog entity.
///
/// Serialized transparently as a JSON number so that form models and catalog
/// documents stay compatible with the enclosing web form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Raw numeric value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// CLUSTER A: SCOPING ENTITIES
// =============================================================================

/// A registered client system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Stable identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Kernel currently running on the client, if the catalog knows it.
    /// Carried through but not used for default selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kernel_id: Option<String>,
}

impl Client {
    /// Create a client without a kernel hint.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: EntityId(id),
            name: name.into(),
            kernel_id: None,
        }
    }
}

/// A product (base channel) a filter can be scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
}

impl Product {
    /// Create a product.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: EntityId(id),
            name: name.into(),
        }
    }
}

// =============================================================================
// CLUSTER B: KERNELS
// =============================================================================

/// A kernel version that live patches can target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kernel {
    /// Stable identifier.
    pub id: EntityId,
    /// Display version string, e.g. `5.14.21-150400.24.46`.
    pub version: String,
    /// Whether the provider marks this kernel as the preferred choice.
    #[serde(default)]
    pub default: bool,
}

impl Kernel {
    /// Create a non-default kernel.
    pub fn new(id: u64, version: impl Into<String>) -> Self {
        Self {
            id: EntityId(id),
            version: version.into(),
            default: false,
        }
    }

    /// Mark this kernel as the provider's default.
    #[must_use]
    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }

    /// Option label: the version, suffixed with ` (default)` for the default kernel.
    #[must_use]
    pub fn label(&self) -> String {
        if self.default {
            format!("{} (default)", self.version)
        } else {
            self.version.clone()
        }
    }
}

// =============================================================================
// CLUSTER C: FORM VARIANTS
// =============================================================================

/// Filter template chosen by the enclosing form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Template {
    /// Live patching scoped to a single client system.
    LivePatchingSystem,
    /// Live patching scoped to a product.
    LivePatchingProduct,
}

impl Template {
    /// Stable wire name of the template.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LivePatchingSystem => "LivePatchingSystem",
            Self::LivePatchingProduct => "LivePatchingProduct",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The scope a kernel list is requested for.
///
/// Kernel providers receive the kind of id alongside the id itself, so a
/// single provider can source client and product kernels differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum KernelScope {
    /// Kernels installed on or available to a client.
    Client(EntityId),
    /// Kernels shipped for a product.
    Product(EntityId),
}

impl KernelScope {
    /// The scoping identifier regardless of its kind.
    #[must_use]
    pub fn id(self) -> EntityId {
        match self {
            Self::Client(id) | Self::Product(id) => id,
        }
    }
}

impl fmt::Display for KernelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client(id) => write!(f, "client:{id}"),
            Self::Product(id) => write!(f, "product:{id}"),
        }
    }
}
