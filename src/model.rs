//! Rendering-ready data model: what one resolved entity looks like after
//! the claim graph has been flattened into a tree.
//!
//! These types serialize into exactly the JSON the presentation layer
//! consumes. Occurrence payloads flatten untagged into their parent object,
//! optional blocks disappear from the output when absent, and all maps keep
//! insertion order.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque identifier of a remote entity, item- or property-style
/// (`Q1438`, `P58`). Compared and hashed as its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Statements of a resolved entity, keyed by normalized English key.
pub type StatementMap = IndexMap<String, Statement>;

/// Qualifiers of one occurrence, keyed by normalized English key.
pub type QualifierMap = IndexMap<String, Qualifier>;

/// One citation block: English key of the cited property to its cited value.
pub type ReferenceMap = IndexMap<String, ReferenceValue>;

/// Coding values of one element, keyed by coding-type label
/// (`"PICA3"`, `"MARC 21"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodingBlock {
    pub format: IndexMap<String, String>,
}

/// A fully resolved entity: the root of the output tree, and the shape of
/// every embedded entity inside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityNode {
    pub id: EntityId,
    pub label: String,
    /// Position of this node in the expansion walk. The top-level entity
    /// takes 1; embedded entities take strictly larger, pairwise distinct
    /// values. Frontends use it to key repeated embeds of the same entity.
    #[serde(rename = "entitycounter")]
    pub entity_counter: u64,
    pub description: String,
    pub statements: StatementMap,
}

/// One resolved claim group of an entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub link: String,
    /// Coding-format map of the owning entity, attached only on the
    /// designated format property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<IndexMap<String, String>>,
    /// Coding metadata of the property itself, when the coding table has it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coding: Option<CodingBlock>,
    pub occurrences: Vec<Occurrence>,
}

/// Payload of one occurrence. Serializes untagged, so the variant fields
/// land directly in the occurrence object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OccurrenceValue {
    /// An embedded entity, fully resolved in place of the reference.
    Entity(Box<EntityNode>),
    /// A reference to another entity, kept as id plus presentation fields.
    Reference {
        id: EntityId,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        link: String,
    },
    /// A literal value copied through from the raw snak.
    Literal { value: Value },
}

/// One value instance of a statement or qualifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    #[serde(flatten)]
    pub value: OccurrenceValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coding: Option<CodingBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifiers: Option<QualifierMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<ReferenceMap>>,
}

impl Occurrence {
    /// Occurrence around a bare value payload.
    pub fn literal(value: Value) -> Self {
        Self::from_value(OccurrenceValue::Literal { value })
    }

    /// Occurrence for snaks that carry no usable value.
    pub fn empty() -> Self {
        Self::literal(Value::String(String::new()))
    }

    /// Occurrence referencing another entity.
    pub fn reference(id: EntityId, label: Option<String>, link: String) -> Self {
        Self::from_value(OccurrenceValue::Reference { id, label, link })
    }

    /// Occurrence carrying a fully resolved embedded entity.
    pub fn entity(node: EntityNode) -> Self {
        Self::from_value(OccurrenceValue::Entity(Box::new(node)))
    }

    fn from_value(value: OccurrenceValue) -> Self {
        Self {
            value,
            coding: None,
            qualifiers: None,
            references: None,
        }
    }
}

/// Qualifier attached to one occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Qualifier {
    pub id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coding: Option<CodingBlock>,
    pub occurrences: Vec<Occurrence>,
}

/// One cited value inside a reference block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceValue {
    pub id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub value: Value,
}

/// One record of the data-field listing endpoint, with the record key
/// folded in as `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datafield {
    pub id: EntityId,
    #[serde(flatten)]
    pub properties: serde_json::Map<String, Value>,
}
