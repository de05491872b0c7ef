//! hashlog CLI library components.
//!
//! Exposed for the binary and its tests.

pub mod commands;
pub mod fixtures;
pub mod settings;
