//! Request URL construction for the datastore `select` handler.
//!
//! [`SelectQuery`] holds the base URL (endpoint, core, `q`) and an ordered set of
//! per-request parameters that the export pipeline rewrites page by page.

use url::Url;

use crate::config::Core;
use crate::error_handling::ConfigError;

/// `select` request for one core, with mutable per-page parameters.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    base: Url,
    query: String,
    params: Vec<(&'static str, String)>,
}

impl SelectQuery {
    /// Builds `<endpoint>/<core>/select` for the given compiled query.
    ///
    /// A trailing slash on the endpoint is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEndpoint` if the endpoint is not a base URL.
    pub fn new(endpoint: &str, core: Core, query: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = format!("{}/{}/select", endpoint.trim_end_matches('/'), core.as_str());
        let base = Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }

        Ok(Self {
            base,
            query: query.into(),
            params: Vec::new(),
        })
    }

    /// Compiled query sent as `q`.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Sets a parameter, replacing an existing value in place.
    pub fn set(&mut self, key: &'static str, value: impl ToString) -> &mut Self {
        let value = value.to_string();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.params.push((key, value)),
        }
        self
    }

    /// Removes a parameter if present.
    pub fn remove(&mut self, key: &'static str) -> &mut Self {
        self.params.retain(|(k, _)| *k != key);
        self
    }

    /// Current value of a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Full request URL: `q` first, then the parameters in insertion order.
    pub fn url(&self) -> Url {
        let mut url = self.base.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &self.query);
            for (key, value) in &self.params {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}
