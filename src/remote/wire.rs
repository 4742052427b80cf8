//! Serde wire model for the three remote endpoints.
//!
//! Only the fields the resolver consumes are declared; everything else in
//! the payloads is ignored. Claim and snak maps use `IndexMap` so the
//! upstream statement order survives into the resolved tree.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::model::EntityId;

// ---------------------------------------------------------------------------
// Query endpoint
// ---------------------------------------------------------------------------

/// Result envelope of the query endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub results: QueryResults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResults {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// One result row: projected variable name to bound value.
pub type Binding = IndexMap<String, BindingValue>;

#[derive(Debug, Clone, Deserialize)]
pub struct BindingValue {
    pub value: String,
}

// ---------------------------------------------------------------------------
// Entity-read endpoint
// ---------------------------------------------------------------------------

/// Result envelope of the entity-read endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityEnvelope {
    #[serde(default)]
    pub entities: IndexMap<String, RawEntity>,
}

/// One raw entity as the endpoint delivers it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntity {
    #[serde(default)]
    pub labels: IndexMap<String, LanguageValue>,
    #[serde(default)]
    pub descriptions: IndexMap<String, LanguageValue>,
    #[serde(default)]
    pub claims: IndexMap<String, Vec<Claim>>,
}

/// A monolingual text value.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageValue {
    pub value: String,
}

/// One claim: a main snak plus optional qualifier and reference blocks.
#[derive(Debug, Clone, Deserialize)]
pub struct Claim {
    pub mainsnak: Snak,
    #[serde(default)]
    pub qualifiers: Option<IndexMap<String, Vec<Snak>>>,
    #[serde(default)]
    pub references: Option<Vec<ReferenceBlock>>,
}

/// The smallest value-bearing unit of a claim. `snaktype` is `"value"`
/// for actual values; `"somevalue"` and `"novalue"` snaks carry no
/// `datavalue`.
#[derive(Debug, Clone, Deserialize)]
pub struct Snak {
    pub snaktype: String,
    #[serde(default)]
    pub datatype: Option<String>,
    #[serde(default)]
    pub datavalue: Option<DataValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataValue {
    pub value: Value,
}

/// One citation block: cited property id to its snaks.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceBlock {
    #[serde(default)]
    pub snaks: IndexMap<String, Vec<Snak>>,
}

impl Snak {
    /// Id of the referenced entity, when this is a value snak pointing at
    /// one. String and time values have no `id` member and yield `None`.
    pub fn entity_id(&self) -> Option<EntityId> {
        if self.snaktype != "value" {
            return None;
        }
        self.datavalue
            .as_ref()?
            .value
            .get("id")?
            .as_str()
            .map(EntityId::from)
    }

    /// Raw payload of a value snak. `None` for somevalue/novalue snaks and
    /// for value snaks that arrived without a datavalue.
    pub fn literal(&self) -> Option<&Value> {
        if self.snaktype != "value" {
            return None;
        }
        self.datavalue.as_ref().map(|dv| &dv.value)
    }

    /// Whether the snak declares a temporal datatype.
    pub fn is_temporal(&self) -> bool {
        self.datatype.as_deref() == Some("time")
    }

    /// The raw time string of a temporal payload (`"+2021-04-01T00:00:00Z"`).
    pub fn time_value(&self) -> Option<&str> {
        self.datavalue.as_ref()?.value.get("time")?.as_str()
    }
}

// ---------------------------------------------------------------------------
// Data-field listing endpoint
// ---------------------------------------------------------------------------

/// Result envelope of the data-field listing endpoint: records keyed by
/// property id.
#[derive(Debug, Clone, Deserialize)]
pub struct DatafieldListing {
    #[serde(default)]
    pub fields: IndexMap<String, serde_json::Map<String, Value>>,
}
