//! Remote knowledge-base access: transport, response caching, the fixed
//! lookup queries, and the wire model of the three endpoints.
//!
//! [`Fetcher`] is the seam between the resolver and the network. Production
//! wires [`CachedFetcher`] over [`HttpFetcher`]; tests substitute an
//! in-memory double. URLs are built here, by the same functions for callers
//! and cache keys, so a route registered in a test matches the URL the
//! resolver computes.

pub mod cache;
pub mod http;
pub mod queries;
pub mod wire;

pub use cache::{CachedFetcher, ResponseCache};
pub use http::HttpFetcher;

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::error::RemoteError;
use crate::model::EntityId;

/// Path of the query endpoint, relative to the wiki root.
pub const QUERY_PATH: &str = "/query/proxy/wdqs/bigdata/namespace/wdq/sparql";

/// Path of the entity-read endpoint, relative to the wiki root.
pub const ENTITY_PATH: &str = "/w/api.php";

/// Path of the data-field listing endpoint, relative to the wiki root.
pub const DATAFIELDS_PATH: &str = "/w/rest.php/gnd/doku/v1/datafields";

/// Blocking fetch of one JSON payload by URL.
///
/// Implementations are shared across resolver worker threads, hence the
/// `Send + Sync` bound. Payloads come back as `Arc`s so cache layers can
/// hand out the same parsed document to every caller.
pub trait Fetcher: Send + Sync {
    fn fetch_json(&self, url: &str) -> Result<Arc<Value>, RemoteError>;
}

/// Fully qualified query-endpoint URL for a query string.
pub fn query_url(base_url: &str, query: &str) -> String {
    format!(
        "{}{}?query={}",
        base_url.trim_end_matches('/'),
        QUERY_PATH,
        urlencoding::encode(query)
    )
}

/// Fully qualified entity-read URL for a list of ids, labels and
/// descriptions restricted to one language.
pub fn entities_url(base_url: &str, language: &str, ids: &[EntityId]) -> String {
    let joined = ids
        .iter()
        .map(EntityId::as_str)
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{}{}?action=wbgetentities&format=json&languages={}&ids={}",
        base_url.trim_end_matches('/'),
        ENTITY_PATH,
        language,
        joined
    )
}

/// Fully qualified data-field listing URL.
pub fn datafields_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), DATAFIELDS_PATH)
}

/// Reject payloads that carry an endpoint-level error field.
///
/// MediaWiki-style endpoints report failures inside an HTTP 200 body, under
/// `error` (action API) or `errors` (some REST routes). Such payloads must
/// never be treated as data.
pub fn reject_error_payload(url: &str, payload: &Value) -> Result<(), RemoteError> {
    for key in ["error", "errors"] {
        if let Some(detail) = payload.get(key) {
            return Err(RemoteError::ErrorField {
                url: url.to_string(),
                detail: detail.to_string(),
            });
        }
    }
    Ok(())
}

/// Run one query through the fetcher and decode the result rows.
pub fn run_query(
    fetcher: &dyn Fetcher,
    base_url: &str,
    query: &str,
) -> Result<Vec<wire::Binding>, RemoteError> {
    let url = query_url(base_url, query);
    let payload = fetcher.fetch_json(&url)?;
    reject_error_payload(&url, &payload)?;
    let decoded = wire::QueryResponse::deserialize(&*payload).map_err(|e| RemoteError::Decode {
        url,
        message: e.to_string(),
    })?;
    Ok(decoded.results.bindings)
}
