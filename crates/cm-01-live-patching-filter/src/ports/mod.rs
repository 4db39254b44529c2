//! # Ports Module
//!
//! Inbound API of the sub-form and the outbound collaborator traits.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
