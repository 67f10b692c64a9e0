//! Configuration module for cellmark
//!
//! This module handles rendering preferences, including
//! serialization/deserialization to/from JSON and
//! persistent storage to platform-specific directories.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
