//! Error type definitions.
//!
//! This module defines the error types used throughout the exporter, one enum per
//! concern. The library boundary wraps them in `anyhow::Error`.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

use crate::config::{Core, OutputFormat};

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The API key cannot be sent as a header value.
    #[error("Invalid API key header value: {0}")]
    InvalidHeaderError(#[from] reqwest::header::InvalidHeaderValue),
}

/// Invalid option combinations, detected before any network access.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No API key on the command line or in the environment.
    #[error("Invalid API key. It must be a non-empty string")]
    MissingApiKey,

    /// The output format is not offered by the selected core.
    #[error("Invalid format '{format}' for core '{core}'. Valid formats are: {valid}")]
    FormatNotAllowed {
        /// Requested format
        format: OutputFormat,
        /// Selected core
        core: Core,
        /// Comma-separated list of valid formats
        valid: String,
    },

    /// No output directory given.
    #[error("Invalid output directory. It must be a non-empty path")]
    MissingOutputDirectory,

    /// Page size of zero.
    #[error("Rows per page must be at least 1")]
    InvalidRowsPerPage,

    /// The endpoint cannot be turned into a request URL.
    #[error("Invalid endpoint URL '{endpoint}': {source}")]
    InvalidEndpoint {
        /// Endpoint as configured
        endpoint: String,
        /// Parse failure
        #[source]
        source: url::ParseError,
    },
}

/// Errors reading or compiling a filters file.
#[derive(Error, Debug)]
pub enum FilterError {
    /// The filters file could not be read.
    #[error("Failed to read filters file {path}: {source}")]
    Read {
        /// Filters file path
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The filters file is not a valid filter list.
    #[error("Failed to parse filters file {path}: {source}")]
    Parse {
        /// Filters file path
        path: PathBuf,
        /// JSON failure
        #[source]
        source: serde_json::Error,
    },

    /// A date filter value that is not a date, timestamp or epoch milliseconds.
    #[error("Filter '{id}' has an invalid date value '{value}'")]
    InvalidDate {
        /// Filter id
        id: String,
        /// Offending value
        value: String,
    },

    /// A grouping filter whose value is not a parenthesis.
    #[error("Grouping filter '{id}' must have the value '(' or ')', got '{value}'")]
    InvalidGrouping {
        /// Filter id
        id: String,
        /// Offending value
        value: String,
    },

    /// A `)` without an open group, or a `(` that is never closed.
    #[error("Unbalanced grouping at filter '{id}'")]
    UnbalancedGrouping {
        /// Id of the parenthesis that has no partner
        id: String,
    },

    /// The operator has no query form for the filter type.
    #[error("Filter '{id}' on field '{field}' uses an operator not supported for its type")]
    UnsupportedOperator {
        /// Filter id
        id: String,
        /// Filter field
        field: String,
    },

    /// A filter after the first has a join operator other than `AND` or `OR`.
    #[error("Filter '{id}' has a join operator other than AND or OR")]
    UnrecognizedJoinOperator {
        /// Filter id
        id: String,
    },

    /// A filter after the first has no join operator.
    #[error("Filter '{id}' is missing its join operator")]
    MissingJoinOperator {
        /// Filter id
        id: String,
    },
}

/// Errors talking to the datastore.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("Request to {url} failed: {source}")]
    Transport {
        /// Request URL
        url: String,
        /// Transport failure
        #[source]
        source: ReqwestError,
    },

    /// The datastore answered with a non-success status.
    #[error("HTTP error! status: {status} for {url}: {excerpt}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Request URL
        url: String,
        /// Sanitized start of the response body
        excerpt: String,
    },

    /// The response body is not the expected JSON envelope.
    #[error("Invalid response from {url}: {source}")]
    InvalidResponse {
        /// Request URL
        url: String,
        /// JSON failure
        #[source]
        source: serde_json::Error,
    },

    /// A JSON response without `response.numFound`.
    #[error("Response from {url} has no result count")]
    MissingCount {
        /// Request URL
        url: String,
    },

    /// A cursor request whose response carries no `nextCursorMark`.
    #[error("Response from {url} has no nextCursorMark")]
    MissingCursor {
        /// Request URL
        url: String,
    },
}

/// Errors while running an export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A request failed; the run is aborted.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Writing a page file failed.
    #[error("Failed to write {path}: {source}")]
    Io {
        /// Page file path
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A document's embedded JSON field is not valid JSON.
    #[error("Document {id} has an unparseable embedded JSON field: {source}")]
    EmbeddedJson {
        /// Document id, or `?` when the document has none
        id: String,
        /// JSON failure
        #[source]
        source: serde_json::Error,
    },

    /// The writer cannot consume the payload the request produced.
    #[error("The {writer} writer cannot write a {payload} payload")]
    UnsupportedPayload {
        /// Writer name
        writer: &'static str,
        /// Payload kind
        payload: &'static str,
    },
}
