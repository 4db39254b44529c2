//! # Integration Tests
//!
//! Cross-crate flows exercised through public APIs only.

pub mod e2e_choreography;
pub mod flows;
