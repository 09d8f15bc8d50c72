//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (platform config dir)
//! 3. Project config (./civicpulse.toml)
//! 4. Environment variables (CIVICPULSE_*)
//! 5. CLI arguments (highest priority)
//!
//! The resolved `Config` is passed by value into each pipeline component;
//! there is no process-wide settings object.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
