//! # Live Patching Filter Service
//!
//! The sub-form itself and the controller that keeps its kernel selection in
//! step with the form model.
//!
//! ## Architecture
//!
//! This service:
//! 1. Implements `FilterFieldsApi` for the enclosing form
//! 2. Loads clients and products once on mount
//! 3. Re-derives the kernel list whenever the template or scoping id changes
//! 4. Writes nothing but `kernelId` into the form model

mod component;
mod controller;

pub use component::LivePatchingFilterFields;
pub use controller::{ControllerConfig, DrivingInputs, SelectionController};
