//! # Field Rendering
//!
//! Turns the controller's state and the form model into the three select
//! fields shown by the sub-form, applying the visibility, required and
//! disabled policy.

use serde::Serialize;
use shared_types::{Client, EntityId, FieldKey, Kernel, Product, Template};

use super::selection::{active_scope, KernelStatus};

/// Field label for the client selector.
pub const CLIENT_LABEL: &str = "Client";
/// Field label for the product selector.
pub const PRODUCT_LABEL: &str = "Product";
/// Field label for the kernel selector.
pub const KERNEL_LABEL: &str = "Kernel";

/// Data held by the selection controller at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    /// Clients loaded on mount.
    pub clients: Vec<Client>,
    /// Products loaded on mount.
    pub products: Vec<Product>,
    /// Kernels for the active scope.
    pub kernels: Vec<Kernel>,
    /// Progress of the kernel list.
    pub kernel_status: KernelStatus,
}

/// Scoping and kernel values read from the form model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelSelection {
    /// `clientId`
    pub client_id: Option<EntityId>,
    /// `productId`
    pub product_id: Option<EntityId>,
    /// `kernelId`
    pub kernel_id: Option<EntityId>,
}

/// One option of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    /// Submitted value.
    pub value: EntityId,
    /// Displayed label.
    pub label: String,
}

/// A rendered select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectField {
    /// Form model key the field is bound to.
    pub name: FieldKey,
    /// Field label.
    pub label: &'static str,
    /// Whether the form may not be submitted without a value.
    pub required: bool,
    /// Whether the user can interact with the field.
    pub disabled: bool,
    /// Selectable options in provider order.
    pub options: Vec<SelectOption>,
    /// Current model value.
    pub value: Option<EntityId>,
}

impl SelectField {
    /// Label of the option matching the current value.
    #[must_use]
    pub fn selected_label(&self) -> Option<&str> {
        let value = self.value?;
        self.options
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.label.as_str())
    }
}

/// The fields rendered by the live-patching sub-form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterFieldsView {
    /// Client selector (`LivePatchingSystem` only).
    pub client: Option<SelectField>,
    /// Product selector (`LivePatchingProduct` only).
    pub product: Option<SelectField>,
    /// Kernel selector, always present.
    pub kernel: SelectField,
}

impl FilterFieldsView {
    /// Rendered fields in display order.
    pub fn fields(&self) -> impl Iterator<Item = &SelectField> {
        self.client
            .iter()
            .chain(self.product.iter())
            .chain(std::iter::once(&self.kernel))
    }

    /// Look up a rendered field by its model key.
    #[must_use]
    pub fn field(&self, name: FieldKey) -> Option<&SelectField> {
        self.fields().find(|field| field.name == name)
    }
}

/// Render the sub-form for a template.
#[must_use]
pub fn render_fields(
    template: Template,
    editing: bool,
    selection: ModelSelection,
    snapshot: &SelectionSnapshot,
) -> FilterFieldsView {
    let client = (template == Template::LivePatchingSystem).then(|| SelectField {
        name: FieldKey::ClientId,
        label: CLIENT_LABEL,
        required: true,
        disabled: editing,
        options: snapshot
            .clients
            .iter()
            .map(|client| SelectOption {
                value: client.id,
                label: client.name.clone(),
            })
            .collect(),
        value: selection.client_id,
    });

    let product = (template == Template::LivePatchingProduct).then(|| SelectField {
        name: FieldKey::ProductId,
        label: PRODUCT_LABEL,
        required: true,
        disabled: editing,
        options: snapshot
            .products
            .iter()
            .map(|product| SelectOption {
                value: product.id,
                label: product.name.clone(),
            })
            .collect(),
        value: selection.product_id,
    });

    // Kernel policy ignores `editing`: it only follows the active scope.
    let scoped = active_scope(template, selection.client_id, selection.product_id).is_some();
    let kernel = SelectField {
        name: FieldKey::KernelId,
        label: KERNEL_LABEL,
        required: scoped,
        disabled: !scoped || snapshot.kernel_status.is_failed(),
        options: snapshot
            .kernels
            .iter()
            .map(|kernel| SelectOption {
                value: kernel.id,
                label: kernel.label(),
            })
            .collect(),
        value: selection.kernel_id,
    };

    FilterFieldsView {
        client,
        product,
        kernel,
    }
}
