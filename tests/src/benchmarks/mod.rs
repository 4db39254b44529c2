//! # Content-Management Filter Benchmarks
//!
//! Performance benchmarks per component.

pub mod cm_01_live_patching;
