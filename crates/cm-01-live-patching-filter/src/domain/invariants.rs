//! # Domain Invariants
//!
//! Rules that must hold whenever the sub-form is quiescent (no provider
//! request in flight).

use shared_types::{EntityId, FieldKey, Kernel, Template};

use super::fields::{ModelSelection, SelectionSnapshot};
use super::selection::{active_scope, select_default_kernel, KernelStatus};

/// Invariant: without an active scope there is no kernel list and no kernel.
pub fn invariant_scope_consistency(
    template: Template,
    selection: ModelSelection,
    snapshot: &SelectionSnapshot,
) -> bool {
    if active_scope(template, selection.client_id, selection.product_id).is_some() {
        return true;
    }
    snapshot.kernels.is_empty() && selection.kernel_id.is_none()
}

/// Invariant: a successfully loaded, non-empty list seeds its default kernel.
///
/// Only meaningful right after the controller committed the list, before the
/// user picked another kernel.
pub fn invariant_default_selection(kernels: &[Kernel], kernel_id: Option<EntityId>) -> bool {
    kernels.is_empty() || kernel_id == select_default_kernel(kernels)
}

/// Invariant: the kernel list belongs to the active scope.
pub fn invariant_kernels_match_scope(
    template: Template,
    selection: ModelSelection,
    snapshot: &SelectionSnapshot,
) -> bool {
    let scope = active_scope(template, selection.client_id, selection.product_id);
    match snapshot.kernel_status {
        KernelStatus::Ready(loaded) => Some(loaded) == scope,
        _ => snapshot.kernels.is_empty(),
    }
}

/// Invariant: the controller only ever writes `kernelId`.
pub fn invariant_key_isolation<'a>(written_keys: impl IntoIterator<Item = &'a str>) -> bool {
    written_keys
        .into_iter()
        .all(|key| key == FieldKey::KernelId.as_str())
}
