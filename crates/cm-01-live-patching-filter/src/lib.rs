//! # Live Patching Filter Fields
//!
//! **Component ID:** CM-01
//! **Templates:** `LivePatchingSystem`, `LivePatchingProduct`
//!
//! ## Purpose
//!
//! The sub-form of a content-management filter that scopes live-patching
//! content. Under `LivePatchingSystem` the user picks a client, under
//! `LivePatchingProduct` a product; either choice cascades into the list of
//! kernels available for it, and the default kernel is pre-selected.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | No scope means no kernels and no `kernelId` | `service/controller.rs` - `observe()` |
//! | Default kernel seeds `kernelId` | `domain/selection.rs` - `select_default_kernel()` |
//! | Superseded loads never commit | `service/controller.rs` - `RequestKey` check |
//! | Only `kernelId` is written | `ports/outbound.rs` - `write_kernel_id()` |
//! | No writes after tear-down | `service/controller.rs` - `tear_down()` |
//!
//! ## Kernel Derivation
//!
//! ```text
//! template / clientId / productId / writer changed
//!        │
//!        ├── no active scope ──→ kernels = [], kernelId = null
//!        │
//!        └── scope ──→ get_kernels(scope) ──→ key still current? ──→ commit
//!                                                  │
//!                                                  └── no ──→ discard
//! ```
//!
//! | Provider outcome | Kernel list | `kernelId` | Kernel selector |
//! |------------------|-------------|------------|-----------------|
//! | Non-empty list | the list | default, else first | enabled |
//! | Empty list | empty | null | enabled |
//! | Error | empty | null | disabled |
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | Catalog backend | `ClientProvider`, `ProductProvider` | Selector options |
//! | Catalog backend | `KernelProvider` | Kernels per client or product |
//! | Enclosing form | `FormState`, `ModelWriter` | Model read and `kernelId` write |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - SharedFormModel, StaticCatalog, FailingProvider    │
//! │  service/  - LivePatchingFilterFields, SelectionController      │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - FilterFieldsApi trait                      │
//! │  ports/outbound.rs - Provider, FormState, ModelWriter traits    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/selection.rs  - active scope, default kernel, RequestKey│
//! │  domain/fields.rs     - select field policy and rendering       │
//! │  domain/invariants.rs - invariant checks                        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let model = Arc::new(SharedFormModel::new());
//! let fields = LivePatchingFilterFields::new(
//!     FormContext::shared(model.clone()),
//!     Providers::from_catalog(Arc::new(StaticCatalog::placeholder())),
//! );
//!
//! model.set_model_value("clientId", json!(1));
//! fields.render(&FilterFieldsProps::new(Template::LivePatchingSystem));
//! fields.settle().await;
//! assert_eq!(model.id(FieldKey::KernelId), Some(EntityId(456)));
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
pub use service::*;
