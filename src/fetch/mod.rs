//! Datastore requests.
//!
//! The export pipeline only sees the [`Fetch`] trait: one GET, returning the
//! status and body whatever the status is. [`HttpFetcher`] is the `reqwest`
//! implementation; tests substitute their own.

mod response;

use async_trait::async_trait;
use log::debug;
use url::Url;

use crate::error_handling::FetchError;

pub use response::{ResultSet, SelectResponse};

/// Status and body of one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBody {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl FetchedBody {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One GET against the datastore.
///
/// Implementations return `Ok` for any HTTP status and `Err` only when no
/// response was obtained.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Issues a GET for `url`.
    async fn fetch(&self, url: &Url) -> Result<FetchedBody, FetchError>;
}

/// [`Fetch`] over a `reqwest::Client`.
///
/// The subscription key header is configured on the client (see
/// [`crate::initialization::init_client`]).
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Wraps a configured client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedBody, FetchError> {
        debug!("GET {}", url);
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;

        debug!("{} -> {} ({} bytes)", url, status, body.len());
        Ok(FetchedBody { status, body })
    }
}
