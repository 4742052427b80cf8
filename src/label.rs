//! Display-label cleaning and English key normalization.
//!
//! Wiki labels carry a namespace prefix in front of the human-readable part
//! (`"RDA - Titel des Werks"`), separated by a spaced dash. Rendering wants
//! only the part after the prefix. English labels double as statement keys
//! after normalization.

/// Label used when an entity has no display label in the configured language.
pub const NO_LABEL: &str = "No Label Defined";

/// Prefix separators as they occur in the wild: plain dash and em-dash,
/// both surrounded by single spaces.
const DELIMITERS: [&str; 2] = [" - ", " \u{2014} "];

/// Strip everything up to and including the last delimiter occurrence.
///
/// A delimiter starting at byte 0 does not count as a prefix separator, so
/// labels that merely begin with a spaced dash pass through unchanged. The
/// result contains no strippable delimiter, which makes cleaning idempotent.
pub fn clean_label(label: &str) -> String {
    let cut = DELIMITERS
        .iter()
        .filter_map(|delim| {
            label
                .rfind(delim)
                .filter(|&pos| pos > 0)
                .map(|pos| pos + delim.len())
        })
        .max();
    match cut {
        Some(cut) => label[cut..].to_string(),
        None => label.to_string(),
    }
}

/// Normalize an English element label into a statement key: lowercased with
/// all spaces removed (`"Title of the Work"` becomes `"titleofthework"`).
pub fn english_key(label: &str) -> String {
    label.to_lowercase().split(' ').collect()
}
