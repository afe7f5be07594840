//! JSON envelope returned by the `select` handler.

use serde::Deserialize;
use serde_json::Value;

use crate::error_handling::FetchError;

/// Top level of a `wt=json` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectResponse {
    /// Result set; absent on some error responses
    #[serde(default)]
    pub response: Option<ResultSet>,
    /// Cursor for the next page; present when `cursorMark` was sent
    #[serde(rename = "nextCursorMark", default)]
    pub next_cursor_mark: Option<String>,
}

/// `response` object of a select response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultSet {
    /// Total matching documents
    #[serde(rename = "numFound", default)]
    pub num_found: Option<u64>,
    /// Documents on this page; anything but an array counts as no documents
    #[serde(default)]
    pub docs: Option<Value>,
}

impl SelectResponse {
    /// Parses a response body.
    pub fn parse(body: &str, url: &str) -> Result<Self, FetchError> {
        serde_json::from_str(body).map_err(|source| FetchError::InvalidResponse {
            url: url.to_string(),
            source,
        })
    }

    /// Documents on this page; empty when the response carries none.
    pub fn docs(&self) -> &[Value] {
        self.response
            .as_ref()
            .and_then(|r| r.docs.as_ref())
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total matching documents.
    pub fn num_found(&self, url: &str) -> Result<u64, FetchError> {
        self.response
            .as_ref()
            .and_then(|r| r.num_found)
            .ok_or_else(|| FetchError::MissingCount {
                url: url.to_string(),
            })
    }

    /// Cursor for the next page.
    pub fn next_cursor(&self, url: &str) -> Result<&str, FetchError> {
        self.next_cursor_mark
            .as_deref()
            .ok_or_else(|| FetchError::MissingCursor {
                url: url.to_string(),
            })
    }
}
