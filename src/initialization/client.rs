//! HTTP client initialization.
//!
//! This module builds the `reqwest::Client` used for every datastore request.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::ClientBuilder;

use crate::config::{Config, SUBSCRIPTION_KEY_HEADER};
use crate::error_handling::InitializationError;

/// Initializes the HTTP client used to talk to the datastore.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the configuration
/// - Timeout from the configuration
/// - The API subscription key as a default header on every request
///
/// # Errors
///
/// Returns `InitializationError::InvalidHeaderError` if the key contains bytes
/// that cannot appear in a header, or `HttpClientError` if client creation fails.
pub fn init_client(config: &Config) -> Result<reqwest::Client, InitializationError> {
    let mut key = HeaderValue::from_str(config.api_key.trim())?;
    key.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(SUBSCRIPTION_KEY_HEADER, key);

    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .build()?;
    Ok(client)
}
