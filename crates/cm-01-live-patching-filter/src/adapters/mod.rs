//! Adapters layer for the live-patching filter fields.
//!
//! In-memory implementations of the form context and the catalog providers.

pub mod shared_form_model;
pub mod static_catalog;

pub use shared_form_model::{SharedFormModel, WRITE_LOG_CAPACITY};
pub use static_catalog::{CatalogDocument, FailingProvider, StaticCatalog, FALLBACK_KERNELS};
