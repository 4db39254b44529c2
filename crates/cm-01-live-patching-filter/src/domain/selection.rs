//! # Selection Rules
//!
//! Pure rules behind the cascading client/product → kernel selection.

use serde::{Deserialize, Serialize};
use shared_types::{EntityId, Kernel, KernelScope, Template};

/// Resolve the scope kernels must be loaded for.
///
/// Only the scoping id that is meaningful under the template is considered:
/// a client under `LivePatchingSystem`, a product under `LivePatchingProduct`.
/// A value left in the other key by an earlier template is ignored.
#[must_use]
pub fn active_scope(
    template: Template,
    client_id: Option<EntityId>,
    product_id: Option<EntityId>,
) -> Option<KernelScope> {
    match template {
        Template::LivePatchingSystem => client_id.map(KernelScope::Client),
        Template::LivePatchingProduct => product_id.map(KernelScope::Product),
    }
}

/// Choose the kernel to pre-select from a freshly loaded list.
///
/// First kernel flagged as default, else the first kernel, else none.
#[must_use]
pub fn select_default_kernel(kernels: &[Kernel]) -> Option<EntityId> {
    kernels
        .iter()
        .find(|kernel| kernel.default)
        .or_else(|| kernels.first())
        .map(|kernel| kernel.id)
}

/// Identity of one kernel derivation.
///
/// A provider result commits only while its key is still the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestKey {
    /// Monotonic derivation counter.
    pub generation: u64,
    /// Scope the derivation loads kernels for (`None` clears the kernel field).
    pub scope: Option<KernelScope>,
}

/// Progress of the kernel list for the current derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelStatus {
    /// No active scope; the kernel list is empty by definition.
    #[default]
    Idle,
    /// A load for the scope is in flight.
    Loading(KernelScope),
    /// The list holds the provider's answer for the scope.
    Ready(KernelScope),
    /// The provider failed for the scope; the list is empty.
    Failed(KernelScope),
}

impl KernelStatus {
    /// Scope the status refers to.
    #[must_use]
    pub fn scope(self) -> Option<KernelScope> {
        match self {
            Self::Idle => None,
            Self::Loading(scope) | Self::Ready(scope) | Self::Failed(scope) => Some(scope),
        }
    }

    /// Whether the last load for the active scope failed.
    #[must_use]
    pub fn is_failed(self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// How superseded kernel loads are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Abort the superseded task and ignore its result should it still arrive.
    #[default]
    Cancel,
    /// Let the superseded task finish and drop its result on arrival.
    Ignore,
}
