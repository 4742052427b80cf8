//! Rich diagnostic error types for the dokutree resolver.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so callers know exactly
//! which remote interaction or lookup failed and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the dokutree resolver.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, sources) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum DokuError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(doku::config::invalid),
        help("Check the ResolverConfig fields. {message}")
    )]
    Invalid { message: String },

    #[error("cannot read configuration file {path}: {source}")]
    #[diagnostic(
        code(doku::config::read),
        help("Verify that the file exists and the process has permission to read it.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse configuration file {path}: {message}")]
    #[diagnostic(
        code(doku::config::parse),
        help(
            "The file is not valid TOML for a ResolverConfig. \
             Compare it against the documented fields; unknown keys are ignored, \
             but values must match the expected types."
        )
    )]
    Parse { path: String, message: String },
}

// ---------------------------------------------------------------------------
// Remote access errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RemoteError {
    #[error("transport failure fetching {url}: {message}")]
    #[diagnostic(
        code(doku::remote::transport),
        help(
            "The request never produced an HTTP response. Check that the wiki \
             base URL is reachable from this host and that DNS and proxies are \
             configured; transient network failures are safe to retry."
        )
    )]
    Transport { url: String, message: String },

    #[error("remote answered {status} for {url}")]
    #[diagnostic(
        code(doku::remote::status),
        help(
            "The endpoint rejected the request. 404 usually means the wiki has \
             no such API path; 5xx means the wiki itself is unhealthy. Nothing \
             was cached for this URL."
        )
    )]
    Status { url: String, status: u16 },

    #[error("remote payload carries an error field for {url}: {detail}")]
    #[diagnostic(
        code(doku::remote::error_field),
        help(
            "The endpoint answered HTTP 200 but embedded an error object in the \
             payload (MediaWiki reports failures this way). The response was not \
             cached, so the next call retries the remote."
        )
    )]
    ErrorField { url: String, detail: String },

    #[error("cannot decode payload from {url}: {message}")]
    #[diagnostic(
        code(doku::remote::decode),
        help(
            "The response body is not the JSON shape this endpoint normally \
             delivers. The wiki software or its API contract may have changed."
        )
    )]
    Decode { url: String, message: String },

    #[error("query result row is missing the {variable} variable")]
    #[diagnostic(
        code(doku::remote::missing_variable),
        help(
            "Every lookup query must project its contract variables (eId, \
             elementLabel, ...). If the query text was edited, restore the \
             projected names; the table builders key on them."
        )
    )]
    MissingVariable { variable: String },
}

// ---------------------------------------------------------------------------
// Lookup table errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LookupError {
    #[error("no English key registered for property {id}")]
    #[diagnostic(
        code(doku::lookup::english_key),
        help(
            "A claim references a property the English-label query did not \
             return, so there is no statement key to file it under. Give the \
             property an English label in the wiki, or remove the claim."
        )
    )]
    EnglishKeyMissing { id: String },

    #[error("no coding metadata registered for element {id}")]
    #[diagnostic(
        code(doku::lookup::coding),
        help(
            "The element is used in a position that requires coding metadata \
             (format property or subfield reference) but the codings query \
             returned no rows for it. Add the coding statements in the wiki."
        )
    )]
    CodingMissing { id: String },
}

// ---------------------------------------------------------------------------
// Resolution errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error("entity {id} not present in the remote response")]
    #[diagnostic(
        code(doku::resolve::entity_missing),
        help(
            "The entity-read endpoint answered without an entry for this id. \
             The entity may have been deleted or the id may be mistyped."
        )
    )]
    EntityMissing { id: String },

    #[error("malformed claim on {entity} under {property}: {reason}")]
    #[diagnostic(
        code(doku::resolve::malformed_claim),
        help(
            "The raw claim data does not match what this property position \
             requires (for example an expansion property whose value is not an \
             entity reference). Fix the statement in the wiki."
        )
    )]
    MalformedClaim {
        entity: String,
        property: String,
        reason: String,
    },

    #[error("expansion cycle: {id} is already being resolved on this branch ({path})")]
    #[diagnostic(
        code(doku::resolve::expansion_cycle),
        help(
            "Embedded entities reference each other in a loop, which would \
             expand forever. Break the cycle in the wiki, or stop marking one \
             of the involved properties as an expansion property."
        )
    )]
    ExpansionCycle { id: String, path: String },

    #[error("expansion depth exceeded maximum of {max_depth} at {id}")]
    #[diagnostic(
        code(doku::resolve::depth_exceeded),
        help(
            "The chain of embedded entities is deeper than `max_expansion_depth` \
             allows. Increase the limit if the nesting is intentional, or check \
             the wiki for runaway embedding."
        )
    )]
    DepthExceeded { id: String, max_depth: usize },
}

/// Convenience alias for functions returning dokutree results.
pub type DokuResult<T> = std::result::Result<T, DokuError>;
