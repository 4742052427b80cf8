//! Synchronous HTTP transport over ureq.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::Fetcher;
use crate::error::RemoteError;

/// Blocking HTTP transport with a fixed per-request timeout.
///
/// One agent serves all requests, so connections to the wiki are reused
/// across the resolver's worker threads.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_json(&self, url: &str) -> Result<Arc<Value>, RemoteError> {
        tracing::debug!(url, "remote fetch");
        let response = self
            .agent
            .get(url)
            .set("Accept", "application/sparql-results+json, application/json")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(status, _) => RemoteError::Status {
                    url: url.to_string(),
                    status,
                },
                ureq::Error::Transport(transport) => RemoteError::Transport {
                    url: url.to_string(),
                    message: transport.to_string(),
                },
            })?;
        let payload: Value = response.into_json().map_err(|e| RemoteError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(Arc::new(payload))
    }
}
