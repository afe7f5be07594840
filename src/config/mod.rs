//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (endpoint, page size, delays, field names)
//! - CLI option types and parsing
//! - The library [`Config`] and its validation

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, Core, FilterMode, LogFormat, LogLevel, Opt, OutputFormat};
