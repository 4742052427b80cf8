//! Canonical documentation order for resolved statements.

use crate::model::StatementMap;

/// Hand-maintained property order for rendered documentation pages,
/// grouped the way editors think about a field description: namespace
/// membership first, then the documentation namespaces, the GND data
/// model, the field's identifiers and codes, preferred and variant
/// terms, relations, sources, vocabulary mappings, workflow data, and
/// worked examples closing the page.
pub const CANONICAL_PROPERTY_ORDER: [&str; 113] = [
    // Namespace membership
    "P110", "P2", "P115", "P116",
    // DACH documentation
    "P1", "P4", "P124", "P379", "P380", "P401", "P113", "P109", "P396", "P397", "P398", "P402",
    "P7", "P3", "P12", "P8", "P371", "P389", "P392", "P393", "P394",
    // RDA documentation
    "P385", "P126", "P388", "P386", "P387", "P410",
    // GND data model
    "P14", "P10", "P15", "P9", "P60", "P13", "P16", "P132", "P329", "P382", "P383",
    // Identifiers and codes
    "P325", "P326", "P327", "P53", "P295", "P63", "P301", "P108", "P328", "P332", "P334", "P333",
    "P133", "P101", "P245", "P344", "P336", "P340", "P65", "P339",
    // Preferred terms
    "P58", "P90", "P391", "P91", "P93", "P94",
    // Other identifying traits
    "P349", "P351", "P68", "P352", "P353", "P300", "P309", "P310", "P316", "P320", "P322",
    // Variant terms
    "P59", "P96", "P95", "P97", "P99", "P98",
    // Relations
    "P55", "P56", "P70", "P71", "P89", "P72", "P73", "P80",
    // Sources and unstructured descriptions
    "P81", "P358", "P83", "P84", "P85", "P86", "P354", "P355",
    // Preferred terms in other vocabularies
    "P107", "P104", "P105", "P103", "P106",
    // Workflow data
    "P360", "P364", "P367", "P375", "P378", "P370",
    // Examples close the page
    "P11",
];

/// Position of a property in the canonical order. Unlisted properties take
/// -1 and therefore sort in front of every listed one; that has always been
/// the rendered behavior, and pages rely on it for pinned-first properties.
fn canonical_position(id: &str) -> i32 {
    CANONICAL_PROPERTY_ORDER
        .iter()
        .position(|known| *known == id)
        .map_or(-1, |pos| pos as i32)
}

/// Reorder a statement map into canonical documentation order.
///
/// The sort is stable: statements sharing a position (all unlisted ones do)
/// keep their relative claim order, and re-sorting a sorted map is a no-op.
pub fn sort_statements(statements: &mut StatementMap) {
    statements.sort_by(|_, a, _, b| {
        canonical_position(a.id.as_str()).cmp(&canonical_position(b.id.as_str()))
    });
}
