//! Presentation links for resolved entities.

use crate::model::EntityId;

/// Path prefix of the entity detail pages served by the frontend.
pub const ENTRY_PREFIX: &str = "/entries/";

/// Derive the detail-page path for an entity. Pure string work, no I/O.
pub fn entry_link(id: &EntityId) -> String {
    format!("{ENTRY_PREFIX}{id}")
}
