//! The resolver: recursive flattening of the claim graph into trees.
//!
//! [`Resolver`] owns the remote stack and a dedicated worker pool. One
//! `resolve` call builds the three lookup tables, then walks the entity's
//! claims with nested fan-out: sibling claims, sibling occurrences and
//! sibling qualifiers resolve concurrently, each into its own slot, so the
//! output order always matches claim order no matter which fetch finishes
//! first. Claims of expansion properties recurse through the same path,
//! guarded by the ancestor chain and the configured depth limit.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::Value;

use crate::config::ResolverConfig;
use crate::error::{ConfigError, DokuError, DokuResult, LookupError, RemoteError, ResolveError};
use crate::label::{NO_LABEL, clean_label};
use crate::link::entry_link;
use crate::lookup::{self, ElementTable, LookupTables};
use crate::model::{
    Datafield, EntityId, EntityNode, Occurrence, Qualifier, QualifierMap, ReferenceMap,
    ReferenceValue, Statement, StatementMap,
};
use crate::remote::{self, CachedFetcher, Fetcher, HttpFetcher, ResponseCache, wire};
use crate::sort::sort_statements;

/// Monotonic counter disambiguating entities within one top-level
/// resolution. Created fresh per `resolve` call and shared across all
/// expansion branches, so every node takes a distinct value and values
/// grow strictly along any branch.
#[derive(Debug)]
struct EntityCounter(AtomicU64);

impl EntityCounter {
    fn starting_at(first: u64) -> Self {
        Self(AtomicU64::new(first))
    }

    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// Ancestor chain of one expansion branch: the ids being resolved from
/// the top-level entity down to the current node.
#[derive(Debug, Clone)]
struct ExpansionPath {
    ids: Vec<EntityId>,
}

impl ExpansionPath {
    fn root(id: &EntityId) -> Self {
        Self {
            ids: vec![id.clone()],
        }
    }

    fn depth(&self) -> usize {
        self.ids.len()
    }

    /// Extend the chain into an embedded entity. Fails when the entity is
    /// already on this branch, or when the chain has reached the depth
    /// limit. Sibling branches are unaffected either way.
    fn descend(&self, id: &EntityId, max_depth: usize) -> Result<Self, ResolveError> {
        if self.ids.contains(id) {
            return Err(ResolveError::ExpansionCycle {
                id: id.to_string(),
                path: self
                    .ids
                    .iter()
                    .map(EntityId::as_str)
                    .collect::<Vec<_>>()
                    .join(" -> "),
            });
        }
        if self.ids.len() >= max_depth {
            return Err(ResolveError::DepthExceeded {
                id: id.to_string(),
                max_depth,
            });
        }
        let mut ids = self.ids.clone();
        ids.push(id.clone());
        Ok(Self { ids })
    }
}

/// Entity resolution facade: remote access, response caching, lookup
/// tables and the recursive expansion core behind one handle.
pub struct Resolver {
    config: ResolverConfig,
    fetcher: Arc<dyn Fetcher>,
    pool: rayon::ThreadPool,
}

impl Resolver {
    /// Build a resolver with the production stack: HTTP transport behind
    /// a TTL response cache, plus a dedicated worker pool.
    pub fn new(config: ResolverConfig) -> DokuResult<Self> {
        let transport = HttpFetcher::new(Duration::from_secs(config.http_timeout_secs));
        let fetcher = CachedFetcher::new(
            Arc::new(transport),
            Arc::new(ResponseCache::new()),
            Duration::from_secs(config.cache_ttl_secs),
        );
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Build a resolver around an arbitrary fetch layer. Tests inject
    /// in-memory doubles here; callers wanting a shared cache across
    /// several resolvers wire their own [`CachedFetcher`].
    pub fn with_fetcher(config: ResolverConfig, fetcher: Arc<dyn Fetcher>) -> DokuResult<Self> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.fetch_concurrency)
            .thread_name(|index| format!("doku-resolve-{index}"))
            .build()
            .map_err(|e| ConfigError::Invalid {
                message: format!("cannot build worker pool: {e}"),
            })?;
        tracing::info!(
            base_url = %config.base_url,
            language = %config.language,
            workers = config.fetch_concurrency,
            max_depth = config.max_expansion_depth,
            "resolver ready"
        );
        Ok(Self {
            config,
            fetcher,
            pool,
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve one entity into its rendering-ready tree.
    ///
    /// Builds fresh lookup tables, expands the claim graph, and puts the
    /// top-level statements into canonical documentation order. Embedded
    /// entities keep their claim order unsorted; consumers sort nested
    /// statement maps themselves if they want the canonical order there.
    pub fn resolve(&self, id: &EntityId) -> DokuResult<EntityNode> {
        let started = Instant::now();
        let tables = self.build_tables()?;
        let counter = EntityCounter::starting_at(1);
        let mut node = self
            .pool
            .install(|| self.resolve_entity(id, &tables, &counter, &ExpansionPath::root(id)))?;
        sort_statements(&mut node.statements);
        tracing::info!(
            entity = %id,
            statements = node.statements.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "entity resolved"
        );
        Ok(node)
    }

    /// Run one elements-shaped listing query and return the table of ids
    /// with their English keys and namespace assignments. Frontends use
    /// this to enumerate the entities of a namespace.
    pub fn list_elements(&self, query: &str) -> DokuResult<ElementTable> {
        Ok(lookup::build_element_table(&self.run_query(query)?)?)
    }

    /// Resolve every entity named by an elements-shaped listing query.
    ///
    /// One set of lookup tables serves the whole batch; each id is its own
    /// top-level resolution with a fresh counter and a canonical top-level
    /// sort, exactly as if it had been passed to [`Resolver::resolve`].
    pub fn resolve_elements(&self, query: &str) -> DokuResult<Vec<EntityNode>> {
        let ids: Vec<EntityId> = self.list_elements(query)?.into_keys().collect();
        let tables = self.build_tables()?;
        tracing::info!(count = ids.len(), "resolving listed elements");
        let mut nodes = Vec::with_capacity(ids.len());
        for id in &ids {
            let counter = EntityCounter::starting_at(1);
            let mut node = self
                .pool
                .install(|| self.resolve_entity(id, &tables, &counter, &ExpansionPath::root(id)))?;
            sort_statements(&mut node.statements);
            nodes.push(node);
        }
        Ok(nodes)
    }

    /// Fetch the data-field listing from the REST endpoint. The record key
    /// is folded into each record as its `id`, so consumers get
    /// self-contained rows.
    pub fn datafields(&self) -> DokuResult<Vec<Datafield>> {
        let url = remote::datafields_url(&self.config.base_url);
        let payload = self.fetcher.fetch_json(&url)?;
        remote::reject_error_payload(&url, &payload)?;
        let listing =
            wire::DatafieldListing::deserialize(&*payload).map_err(|e| RemoteError::Decode {
                url,
                message: e.to_string(),
            })?;
        Ok(listing
            .fields
            .into_iter()
            .map(|(id, properties)| Datafield {
                id: EntityId::from(id),
                properties,
            })
            .collect())
    }

    // -----------------------------------------------------------------------
    // Lookup tables and raw fetches
    // -----------------------------------------------------------------------

    fn build_tables(&self) -> DokuResult<LookupTables> {
        let english = lookup::build_element_table(&self.run_query(remote::queries::ELEMENT_KEYS_EN)?)?;
        let german = lookup::build_label_table(&self.run_query(remote::queries::DISPLAY_LABELS_DE)?)?;
        let codings = lookup::build_coding_table(&self.run_query(remote::queries::CODINGS)?)?;
        tracing::info!(
            english = english.len(),
            german = german.len(),
            codings = codings.len(),
            "lookup tables built"
        );
        Ok(LookupTables {
            english,
            german,
            codings,
        })
    }

    fn run_query(&self, query: &str) -> Result<Vec<wire::Binding>, RemoteError> {
        remote::run_query(self.fetcher.as_ref(), &self.config.base_url, query)
    }

    fn fetch_raw_entity(&self, id: &EntityId) -> DokuResult<wire::RawEntity> {
        let url = remote::entities_url(
            &self.config.base_url,
            &self.config.language,
            std::slice::from_ref(id),
        );
        let payload = self.fetcher.fetch_json(&url)?;
        remote::reject_error_payload(&url, &payload)?;
        let mut envelope =
            wire::EntityEnvelope::deserialize(&*payload).map_err(|e| RemoteError::Decode {
                url,
                message: e.to_string(),
            })?;
        envelope
            .entities
            .shift_remove(id.as_str())
            .ok_or_else(|| DokuError::from(ResolveError::EntityMissing { id: id.to_string() }))
    }

    // -----------------------------------------------------------------------
    // Recursive expansion core
    // -----------------------------------------------------------------------

    fn resolve_entity(
        &self,
        id: &EntityId,
        tables: &LookupTables,
        counter: &EntityCounter,
        path: &ExpansionPath,
    ) -> DokuResult<EntityNode> {
        let raw = self.fetch_raw_entity(id)?;
        let entity_counter = counter.next();
        tracing::debug!(entity = %id, depth = path.depth(), counter = entity_counter, "resolving entity");

        let label = raw
            .labels
            .get(&self.config.language)
            .map(|l| clean_label(&l.value))
            .unwrap_or_else(|| NO_LABEL.to_string());
        let description = raw
            .descriptions
            .get(&self.config.language)
            .map(|d| d.value.clone())
            .unwrap_or_default();

        let claims: Vec<(&String, &Vec<wire::Claim>)> = raw.claims.iter().collect();
        let resolved: Vec<(String, Statement)> = claims
            .into_par_iter()
            .map(|(property, claims)| {
                self.resolve_statement(id, property, claims, tables, counter, path)
            })
            .collect::<DokuResult<Vec<_>>>()?;

        let mut statements = StatementMap::with_capacity(resolved.len());
        for (key, statement) in resolved {
            statements.insert(key, statement);
        }

        Ok(EntityNode {
            id: id.clone(),
            label,
            entity_counter,
            description,
            statements,
        })
    }

    /// Resolve all claims of one property into a statement, keyed by the
    /// property's English key.
    fn resolve_statement(
        &self,
        entity: &EntityId,
        property: &str,
        claims: &[wire::Claim],
        tables: &LookupTables,
        counter: &EntityCounter,
        path: &ExpansionPath,
    ) -> DokuResult<(String, Statement)> {
        let property_id = EntityId::from(property);
        let element = tables.english.get(&property_id).ok_or_else(|| {
            LookupError::EnglishKeyMissing {
                id: property.to_string(),
            }
        })?;

        // The format property carries the owning entity's coding formats;
        // an entity declaring a format without coding metadata is a wiki
        // data error surfaced as CodingMissing.
        let format = (property_id == self.config.properties.format)
            .then(|| {
                tables
                    .codings
                    .get(entity)
                    .map(|entry| entry.coding.format.clone())
                    .ok_or_else(|| LookupError::CodingMissing {
                        id: entity.to_string(),
                    })
            })
            .transpose()?;

        let occurrences: Vec<Occurrence> = claims
            .par_iter()
            .map(|claim| self.resolve_occurrence(entity, &property_id, claim, tables, counter, path))
            .collect::<DokuResult<Vec<_>>>()?;

        let statement = Statement {
            id: property_id.clone(),
            label: tables.german.get(&property_id).cloned(),
            link: entry_link(&property_id),
            format,
            coding: tables.codings.get(&property_id).map(|entry| entry.coding.clone()),
            occurrences,
        };
        Ok((element.key.clone(), statement))
    }

    /// Build one occurrence from a claim's main snak, then attach coding,
    /// qualifier and reference blocks.
    fn resolve_occurrence(
        &self,
        entity: &EntityId,
        property: &EntityId,
        claim: &wire::Claim,
        tables: &LookupTables,
        counter: &EntityCounter,
        path: &ExpansionPath,
    ) -> DokuResult<Occurrence> {
        let properties = &self.config.properties;

        let mut occurrence = match claim.mainsnak.entity_id() {
            Some(target) => Occurrence::reference(
                target.clone(),
                tables.german.get(&target).cloned(),
                entry_link(&target),
            ),
            None => match claim.mainsnak.literal() {
                Some(value) => Occurrence::literal(value.clone()),
                None => Occurrence::empty(),
            },
        };

        if *property == properties.subfields {
            let target = claim.mainsnak.entity_id().ok_or_else(|| {
                self.malformed(entity, property, "subfield occurrence without an entity reference")
            })?;
            let entry = tables
                .codings
                .get(&target)
                .ok_or_else(|| LookupError::CodingMissing {
                    id: target.to_string(),
                })?;
            occurrence.coding = Some(entry.coding.clone());
        }

        if properties.is_expansion(property) {
            let target = claim.mainsnak.entity_id().ok_or_else(|| {
                self.malformed(entity, property, "expansion occurrence without an entity reference")
            })?;
            let descended = path.descend(&target, self.config.max_expansion_depth)?;
            let node = self.resolve_entity(&target, tables, counter, &descended)?;
            occurrence = Occurrence::entity(node);
        }

        if let Some(qualifiers) = &claim.qualifiers {
            occurrence.qualifiers = Some(self.resolve_qualifiers(qualifiers, tables, counter, path)?);
        }

        if let Some(references) = &claim.references {
            occurrence.references = Some(self.resolve_references(entity, references, tables)?);
        }

        Ok(occurrence)
    }

    /// Resolve all qualifier properties of one occurrence concurrently,
    /// keyed by English key, in source order.
    fn resolve_qualifiers(
        &self,
        qualifiers: &IndexMap<String, Vec<wire::Snak>>,
        tables: &LookupTables,
        counter: &EntityCounter,
        path: &ExpansionPath,
    ) -> DokuResult<QualifierMap> {
        let entries: Vec<(&String, &Vec<wire::Snak>)> = qualifiers.iter().collect();
        let resolved: Vec<(String, Qualifier)> = entries
            .into_par_iter()
            .map(|(property, snaks)| self.resolve_qualifier(property, snaks, tables, counter, path))
            .collect::<DokuResult<Vec<_>>>()?;
        Ok(resolved.into_iter().collect())
    }

    fn resolve_qualifier(
        &self,
        property: &str,
        snaks: &[wire::Snak],
        tables: &LookupTables,
        counter: &EntityCounter,
        path: &ExpansionPath,
    ) -> DokuResult<(String, Qualifier)> {
        let property_id = EntityId::from(property);
        let element = tables.english.get(&property_id).ok_or_else(|| {
            LookupError::EnglishKeyMissing {
                id: property.to_string(),
            }
        })?;

        let occurrences: Vec<Occurrence> = snaks
            .par_iter()
            .map(|snak| self.resolve_qualifier_occurrence(&property_id, snak, tables, counter, path))
            .collect::<DokuResult<Vec<_>>>()?;

        let qualifier = Qualifier {
            id: property_id.clone(),
            label: tables.german.get(&property_id).cloned(),
            coding: tables.codings.get(&property_id).map(|entry| entry.coding.clone()),
            occurrences,
        };
        Ok((element.key.clone(), qualifier))
    }

    /// Build one qualifier occurrence: an entity reference (expanded when
    /// the qualifier property is an expansion property, otherwise carrying
    /// the target's coding block when one exists), a temporal literal, a
    /// plain literal, or the empty value.
    fn resolve_qualifier_occurrence(
        &self,
        property: &EntityId,
        snak: &wire::Snak,
        tables: &LookupTables,
        counter: &EntityCounter,
        path: &ExpansionPath,
    ) -> DokuResult<Occurrence> {
        if let Some(target) = snak.entity_id() {
            if self.config.properties.is_expansion(property) {
                let descended = path.descend(&target, self.config.max_expansion_depth)?;
                let node = self.resolve_entity(&target, tables, counter, &descended)?;
                return Ok(Occurrence::entity(node));
            }
            let mut occurrence = Occurrence::reference(
                target.clone(),
                tables.german.get(&target).cloned(),
                entry_link(&target),
            );
            if let Some(entry) = tables.codings.get(&target) {
                occurrence.coding = Some(entry.coding.clone());
            }
            return Ok(occurrence);
        }

        match snak.literal() {
            Some(value) if snak.is_temporal() => Ok(Occurrence::literal(
                snak.time_value()
                    .map(|time| Value::String(time.to_string()))
                    .unwrap_or_else(|| value.clone()),
            )),
            Some(value) => Ok(Occurrence::literal(value.clone())),
            None => Ok(Occurrence::empty()),
        }
    }

    /// Build the reference maps of one occurrence: one map per citation
    /// block, keyed by the English key of each cited property, carrying
    /// the first snak's value.
    fn resolve_references(
        &self,
        entity: &EntityId,
        references: &[wire::ReferenceBlock],
        tables: &LookupTables,
    ) -> DokuResult<Vec<ReferenceMap>> {
        references
            .iter()
            .map(|block| {
                let mut map = ReferenceMap::with_capacity(block.snaks.len());
                for (property, snaks) in &block.snaks {
                    let property_id = EntityId::from(property.as_str());
                    let element = tables.english.get(&property_id).ok_or_else(|| {
                        LookupError::EnglishKeyMissing {
                            id: property.clone(),
                        }
                    })?;
                    let value = snaks
                        .first()
                        .and_then(|snak| snak.datavalue.as_ref())
                        .map(|dv| dv.value.clone())
                        .ok_or_else(|| {
                            self.malformed(entity, &property_id, "reference snak without a datavalue")
                        })?;
                    let label = tables.german.get(&property_id).cloned();
                    map.insert(
                        element.key.clone(),
                        ReferenceValue {
                            id: property_id,
                            label,
                            value,
                        },
                    );
                }
                Ok(map)
            })
            .collect()
    }

    fn malformed(&self, entity: &EntityId, property: &EntityId, reason: &str) -> DokuError {
        DokuError::from(ResolveError::MalformedClaim {
            entity: entity.to_string(),
            property: property.to_string(),
            reason: reason.to_string(),
        })
    }
}
