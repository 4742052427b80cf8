//! Resolver configuration and the designated property set.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::EntityId;

/// Wiki root the resolver talks to when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://doku.wikibase.wiki";

/// The property ids that steer resolution: which statement attaches the
/// entity's own coding formats, which occurrences carry subfield codings,
/// and which claims expand into embedded entities.
///
/// The defaults are the ids of the documentation platform's data model.
/// Deployments with a different model override them in the TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertySet {
    /// Statement property whose presence attaches the owning entity's
    /// coding-format map to the statement.
    pub format: EntityId,
    /// Property whose occurrences carry the referenced subfield's coding
    /// block. Referenced subfields must have coding metadata.
    pub subfields: EntityId,
    /// Expansion property: worked examples.
    pub example: EntityId,
    /// Expansion property: embedded items.
    pub embedded_item: EntityId,
    /// Expansion property: embedded properties.
    pub embedded_property: EntityId,
}

impl Default for PropertySet {
    fn default() -> Self {
        Self {
            format: EntityId::from("P4"),
            subfields: EntityId::from("P15"),
            example: EntityId::from("P11"),
            embedded_item: EntityId::from("P396"),
            embedded_property: EntityId::from("P411"),
        }
    }
}

impl PropertySet {
    /// Whether claims of this property expand into embedded entities.
    pub fn is_expansion(&self, id: &EntityId) -> bool {
        *id == self.example || *id == self.embedded_item || *id == self.embedded_property
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let all = [
            &self.format,
            &self.subfields,
            &self.example,
            &self.embedded_item,
            &self.embedded_property,
        ];
        if all.iter().any(|id| id.as_str().is_empty()) {
            return Err(ConfigError::Invalid {
                message: "property ids must not be empty".into(),
            });
        }
        let expansions = [&self.example, &self.embedded_item, &self.embedded_property];
        for (index, id) in expansions.iter().enumerate() {
            if expansions[index + 1..].contains(id) {
                return Err(ConfigError::Invalid {
                    message: format!("expansion property {id} is listed twice"),
                });
            }
        }
        Ok(())
    }
}

/// Configuration for a [`crate::resolver::Resolver`].
///
/// All fields have working defaults; a TOML file only needs the keys it
/// wants to override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Root URL of the wiki, scheme included, no trailing path.
    pub base_url: String,
    /// Language of display labels and descriptions.
    pub language: String,
    /// Lifetime of cached remote responses, in seconds.
    pub cache_ttl_secs: u64,
    /// Per-request HTTP timeout, in seconds.
    pub http_timeout_secs: u64,
    /// Worker threads fetching and resolving concurrently. Also bounds the
    /// number of in-flight requests against the wiki.
    pub fetch_concurrency: usize,
    /// Maximum number of entities on one expansion chain, the top-level
    /// entity included. 1 disables expansion entirely.
    pub max_expansion_depth: usize,
    /// The designated property ids.
    pub properties: PropertySet,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "de".to_string(),
            cache_ttl_secs: 24 * 60 * 60,
            http_timeout_secs: 30,
            fetch_concurrency: 8,
            max_expansion_depth: 8,
            properties: PropertySet::default(),
        }
    }
}

impl ResolverConfig {
    /// Load a configuration from a TOML file. Missing keys fall back to
    /// the defaults; the result is validated before it is returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations a resolver cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                message: format!("base_url must be an http(s) URL, got {:?}", self.base_url),
            });
        }
        if self.language.is_empty() {
            return Err(ConfigError::Invalid {
                message: "language must not be empty".into(),
            });
        }
        if self.fetch_concurrency == 0 {
            return Err(ConfigError::Invalid {
                message: "fetch_concurrency must be at least 1".into(),
            });
        }
        if self.max_expansion_depth == 0 {
            return Err(ConfigError::Invalid {
                message: "max_expansion_depth must be at least 1".into(),
            });
        }
        self.properties.validate()
    }
}
