//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, etc.)
//! - Security header names matched by the HTML analyzer
//! - The library `Config` struct and its validation

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{
    Config, ConfigValidationError, DuplicatePolicy, LogFormat, LogLevel, WhitelistPolicy,
};
