//! Fixed queries issued against the wiki's query endpoint.
//!
//! The projected variable names are a contract consumed by the table
//! builders in [`crate::lookup`]: `eId`, `elementLabel`, `assignmentId`,
//! `assignmentLabel` for elements-shaped results, plus `codingTypeLabel`
//! and `coding` for the codings query. Renaming a variable here breaks
//! table construction at runtime with a `missing_variable` error.
//!
//! `P110` links an element to its namespace, `P4` carries coding values
//! and `P3` the coding type; these are fixed ids of the documentation
//! platform's own data model, not of Wikidata.

/// All elements with an English label, plus their namespace assignment
/// where one exists. Feeds the English-key table.
pub const ELEMENT_KEYS_EN: &str = r#"PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX wdt: <https://doku.wikibase.wiki/prop/direct/>
SELECT ?eId ?elementLabel ?assignmentId ?assignmentLabel WHERE {
  ?element rdfs:label ?elementLabel .
  FILTER (LANG(?elementLabel) = "en")
  BIND (STRAFTER(STR(?element), "/entity/") AS ?eId)
  OPTIONAL {
    ?element wdt:P110 ?assignment .
    ?assignment rdfs:label ?assignmentLabel .
    FILTER (LANG(?assignmentLabel) = "en")
    BIND (STRAFTER(STR(?assignment), "/entity/") AS ?assignmentId)
  }
}"#;

/// All elements with a German label. Feeds the display-label table.
pub const DISPLAY_LABELS_DE: &str = r#"PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
SELECT ?eId ?elementLabel WHERE {
  ?element rdfs:label ?elementLabel .
  FILTER (LANG(?elementLabel) = "de")
  BIND (STRAFTER(STR(?element), "/entity/") AS ?eId)
}"#;

/// All coding statements: one row per element, coding type and value.
/// Feeds the coding table, which groups the rows by element id.
pub const CODINGS: &str = r#"PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX p: <https://doku.wikibase.wiki/prop/>
PREFIX ps: <https://doku.wikibase.wiki/prop/statement/>
PREFIX pq: <https://doku.wikibase.wiki/prop/qualifier/>
SELECT ?eId ?elementLabel ?codingTypeLabel ?coding WHERE {
  ?element p:P4 ?codingStatement .
  ?codingStatement ps:P4 ?coding ;
                   pq:P3 ?codingType .
  ?codingType rdfs:label ?codingTypeLabel .
  FILTER (LANG(?codingTypeLabel) = "de")
  ?element rdfs:label ?elementLabel .
  FILTER (LANG(?elementLabel) = "de")
  BIND (STRAFTER(STR(?element), "/entity/") AS ?eId)
}"#;

/// All properties of the RDA documentation namespace, elements-shaped.
pub const RDA_PROPERTIES: &str = r#"PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX wdt: <https://doku.wikibase.wiki/prop/direct/>
PREFIX wd: <https://doku.wikibase.wiki/entity/>
SELECT ?eId ?elementLabel WHERE {
  ?element wdt:P110 wd:Q3 .
  ?element rdfs:label ?elementLabel .
  FILTER (LANG(?elementLabel) = "en")
  BIND (STRAFTER(STR(?element), "/entity/") AS ?eId)
}"#;

/// All application rules of the RDA documentation namespace,
/// elements-shaped.
pub const RDA_RULES: &str = r#"PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX wdt: <https://doku.wikibase.wiki/prop/direct/>
PREFIX wd: <https://doku.wikibase.wiki/entity/>
SELECT ?eId ?elementLabel WHERE {
  ?element wdt:P110 wd:Q4 .
  ?element rdfs:label ?elementLabel .
  FILTER (LANG(?elementLabel) = "en")
  BIND (STRAFTER(STR(?element), "/entity/") AS ?eId)
}"#;
