//! Utility functions.
//!
//! This module provides string sanitization for filter values and for response
//! bodies quoted in error messages.

pub mod sanitize;

pub use sanitize::{sanitize_and_truncate_error_message, sanitize_query_string};
