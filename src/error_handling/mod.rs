//! Error handling.
//!
//! Errors are split by concern:
//! - **Configuration**: invalid option combinations, raised before any request
//! - **Filters**: unreadable filter files and filters with no query form
//! - **Fetch**: transport failures and non-success responses (never retried)
//! - **Export**: fetch failures plus anything that goes wrong writing a page
//! - **Initialization**: logger and HTTP client setup

mod types;

// Re-export public API
pub use types::{ConfigError, ExportError, FetchError, FilterError, InitializationError};
