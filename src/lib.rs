//! # dokutree
//!
//! Entity-resolution and caching engine for structured-data documentation
//! wikis. Takes a Wikibase-style entity id and flattens the claim graph
//! behind it into one rendering-ready tree: display labels resolved,
//! statement maps keyed by normalized English labels, coding metadata
//! attached, embedded entities expanded in place.
//!
//! ## Architecture
//!
//! - **Remote access** (`remote`): sync HTTP transport, TTL response cache,
//!   the fixed lookup queries and the wire model of the three endpoints
//! - **Lookup tables** (`lookup`): English keys, display labels and coding
//!   metadata built from query results
//! - **Resolution** (`resolver`): recursive claim expansion over a bounded
//!   worker pool, with cycle and depth guards
//! - **Ordering** (`sort`): the canonical documentation order of statements
//!
//! ## Library usage
//!
//! ```no_run
//! use dokutree::config::ResolverConfig;
//! use dokutree::model::EntityId;
//! use dokutree::resolver::Resolver;
//!
//! let resolver = Resolver::new(ResolverConfig::default()).unwrap();
//! let field = resolver.resolve(&EntityId::from("P58")).unwrap();
//! println!("{}", serde_json::to_string_pretty(&field).unwrap());
//! ```

pub mod config;
pub mod error;
pub mod label;
pub mod link;
pub mod lookup;
pub mod model;
pub mod remote;
pub mod resolver;
pub mod sort;
