//! # Domain Module
//!
//! Selection rules, field policy and invariants of the live-patching filter.

pub mod fields;
pub mod invariants;
pub mod selection;

pub use fields::*;
pub use invariants::*;
pub use selection::*;
