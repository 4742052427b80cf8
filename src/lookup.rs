//! Lookup tables built from query results.
//!
//! A resolution run needs three tables before it can touch any entity:
//! English keys (statement map keys plus namespace assignments), German
//! display labels, and coding metadata. All three are built here from the
//! raw binding rows of the fixed queries.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::RemoteError;
use crate::label::{clean_label, english_key};
use crate::model::{CodingBlock, EntityId};
use crate::remote::wire::Binding;

/// One English-key row: normalized statement key plus namespace assignment.
/// Elements outside every namespace carry empty assignment fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementEntry {
    pub key: String,
    pub assignment_id: String,
    pub assignment_label: String,
}

/// Element id to English key and assignment, in query result order.
/// Doubles as the result shape of listing queries, hence the ordered map.
pub type ElementTable = IndexMap<EntityId, ElementEntry>;

/// Element id to cleaned German display label.
pub type LabelTable = HashMap<EntityId, String>;

/// Element id to coding metadata.
pub type CodingTable = HashMap<EntityId, CodingEntry>;

/// One coding-table row: raw display label plus the grouped coding block.
#[derive(Debug, Clone, PartialEq)]
pub struct CodingEntry {
    pub label: String,
    pub coding: CodingBlock,
}

/// The three lookup tables threaded through one resolution run.
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    pub english: ElementTable,
    pub german: LabelTable,
    pub codings: CodingTable,
}

fn required<'a>(binding: &'a Binding, variable: &'static str) -> Result<&'a str, RemoteError> {
    binding
        .get(variable)
        .map(|bound| bound.value.as_str())
        .ok_or_else(|| RemoteError::MissingVariable {
            variable: variable.to_string(),
        })
}

fn optional<'a>(binding: &'a Binding, variable: &str) -> &'a str {
    binding.get(variable).map_or("", |bound| bound.value.as_str())
}

/// Build the English-key table from elements-shaped bindings. Later rows
/// for the same id replace earlier ones.
pub fn build_element_table(bindings: &[Binding]) -> Result<ElementTable, RemoteError> {
    let mut table = ElementTable::with_capacity(bindings.len());
    for binding in bindings {
        let id = EntityId::from(required(binding, "eId")?);
        let entry = ElementEntry {
            key: english_key(required(binding, "elementLabel")?),
            assignment_id: optional(binding, "assignmentId").to_string(),
            assignment_label: optional(binding, "assignmentLabel").to_string(),
        };
        table.insert(id, entry);
    }
    Ok(table)
}

/// Build the display-label table, cleaning each label's namespace prefix.
pub fn build_label_table(bindings: &[Binding]) -> Result<LabelTable, RemoteError> {
    let mut table = LabelTable::with_capacity(bindings.len());
    for binding in bindings {
        let id = EntityId::from(required(binding, "eId")?);
        table.insert(id, clean_label(required(binding, "elementLabel")?));
    }
    Ok(table)
}

/// Build the coding table, grouping all rows that share one element id
/// into a single entry. The label is taken from the rows as delivered,
/// last one winning; coding values accumulate per coding-type label.
pub fn build_coding_table(bindings: &[Binding]) -> Result<CodingTable, RemoteError> {
    let mut table = CodingTable::new();
    for binding in bindings {
        let id = EntityId::from(required(binding, "eId")?);
        let label = required(binding, "elementLabel")?;
        let coding_type = required(binding, "codingTypeLabel")?;
        let value = required(binding, "coding")?;

        let entry = table.entry(id).or_insert_with(|| CodingEntry {
            label: String::new(),
            coding: CodingBlock {
                format: IndexMap::new(),
            },
        });
        entry.label = label.to_string();
        entry
            .coding
            .format
            .insert(coding_type.to_string(), value.to_string());
    }
    Ok(table)
}
