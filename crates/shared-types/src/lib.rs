//! # Shared Types Crate
//!
//! This crate contains the catalog entities, the form model shared with the
//! enclosing filter form, and the error types reported by data providers.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Client, Product and Kernel are defined here
//!   and consumed by every component and adapter.
//! - **Key Isolation**: The form model is an open map; components address the
//!   keys they own through [`FieldKey`] and leave every other key untouched.

pub mod entities;
pub mod errors;
pub mod form_model;

pub use entities::*;
pub use errors::*;
pub use form_model::{FieldKey, FormModel};
