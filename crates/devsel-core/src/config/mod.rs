//! Configuration utilities for device selection.

pub mod selector;

// Re-export key items
pub use selector::{SelectorConfig, SelectorConfigBuilder, DEVICE_ENV_VAR};
