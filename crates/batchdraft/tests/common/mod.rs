//! Shared helpers for batchdraft integration tests.
//!
//! - `ScriptedCreator`: stub product API with per-SKU failures and an optional
//!   gate that holds dispatches until the test releases them
//! - record builders

#![allow(dead_code)]

pub mod builders;
pub mod stub;

pub use builders::*;
pub use stub::ScriptedCreator;
