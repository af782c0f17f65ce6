//! Error types for the crate
//!
//! Nothing here aborts a list pass: capability failures are recovered and
//! reported as [`VaultListError`]s. Only configuration loading returns errors
//! to the caller.

// Re-export error types from submodules
pub use crate::capability::{CapabilityError, VaultListError};
pub use crate::config::ConfigError;
pub use crate::model::ParseUriMatchTypeError;
