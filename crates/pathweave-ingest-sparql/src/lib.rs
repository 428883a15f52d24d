//! Query-service ingestion for Pathweave (boundary adapter).
//!
//! Parses SPARQL 1.1 JSON results (`application/sparql-results+json`) from a
//! pathway endpoint into typed [`QueryRow`]s, then validates them into core
//! [`RawRow`]s:
//!
//! - every binding variable is optional; unknown variables are ignored,
//! - rows without a source or target URI never reach the core,
//! - labels and types are passed through untouched (canonicalization is the
//!   core's job).
//!
//! Fetching is out of scope here; callers hand over the response body.

use anyhow::{bail, Context, Result};
use pathweave_core::RawRow;
use serde::{Deserialize, Serialize};

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResults {
    #[serde(default)]
    pub head: QueryHead,
    #[serde(default)]
    pub results: QueryBindings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryBindings {
    #[serde(default)]
    pub bindings: Vec<QueryRow>,
}

/// One bound RDF term: `{"type": "uri", "value": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// A result row as the query service returns it; every variable may be unbound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRow {
    pub source: Option<Term>,
    pub source_label: Option<Term>,
    pub target: Option<Term>,
    pub target_label: Option<Term>,
    pub interaction: Option<Term>,
    pub interaction_label: Option<Term>,
    pub interaction_type: Option<Term>,
    pub source_type: Option<Term>,
    pub target_type: Option<Term>,
    pub pathway_title: Option<Term>,
}

fn value_of(term: Option<Term>) -> Option<String> {
    term.map(|t| t.value).filter(|v| !v.is_empty())
}

impl QueryRow {
    /// Validate into a core row; `None` when either URI is unbound or empty.
    pub fn into_raw_row(self) -> Option<RawRow> {
        let source = value_of(self.source)?;
        let target = value_of(self.target)?;
        Some(RawRow {
            source,
            source_label: value_of(self.source_label),
            target,
            target_label: value_of(self.target_label),
            interaction: value_of(self.interaction),
            interaction_label: value_of(self.interaction_label),
            interaction_type: value_of(self.interaction_type),
            source_type: value_of(self.source_type),
            target_type: value_of(self.target_type),
            ..RawRow::default()
        })
    }
}

impl QueryResults {
    /// Title bound on the first row, if any.
    pub fn pathway_title(&self) -> Option<&str> {
        self.results
            .bindings
            .first()
            .and_then(|row| row.pathway_title.as_ref())
            .map(|t| t.value.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Core rows in result order; rows without both URIs are dropped.
    pub fn into_rows(self) -> Vec<RawRow> {
        let total = self.results.bindings.len();
        let rows: Vec<RawRow> = self
            .results
            .bindings
            .into_iter()
            .filter_map(QueryRow::into_raw_row)
            .collect();
        if rows.len() < total {
            tracing::debug!(
                dropped = total - rows.len(),
                "query rows without source/target URI"
            );
        }
        rows
    }
}

pub fn parse_results(json: &str) -> Result<QueryResults> {
    serde_json::from_str(json).context("failed to parse SPARQL results JSON")
}

// ============================================================================
// Query text
// ============================================================================

/// Pathway ids are embedded in a string literal, so only plain identifiers pass.
fn check_pathway_id(pathway_id: &str) -> Result<()> {
    if pathway_id.is_empty()
        || !pathway_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        bail!("invalid pathway id: {pathway_id:?}");
    }
    Ok(())
}

/// Interaction query for one pathway: endpoints, labels, optional types, title.
pub fn interaction_query(pathway_id: &str) -> Result<String> {
    check_pathway_id(pathway_id)?;
    Ok(format!(
        r#"PREFIX wp: <http://vocabularies.wikipathways.org/wp#>
PREFIX dc: <http://purl.org/dc/elements/1.1/>
PREFIX dcterms: <http://purl.org/dc/terms/>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>

SELECT DISTINCT
    ?source ?sourceLabel
    ?target ?targetLabel
    ?interaction
    ?interactionType
    ?sourceType
    ?targetType
    ?pathwayTitle
WHERE {{
  ?pathway a wp:Pathway ;
           dcterms:identifier "{pathway_id}" ;
           dc:title ?pathwayTitle .

  ?interaction a wp:Interaction ;
               dcterms:isPartOf ?pathway ;
               wp:source ?source ;
               wp:target ?target .

  ?source rdfs:label ?sourceLabel .
  ?target rdfs:label ?targetLabel .

  OPTIONAL {{ ?source a ?sourceType . }}
  OPTIONAL {{ ?target a ?targetType . }}
  OPTIONAL {{ ?interaction a ?interactionType . }}
}}
"#
    ))
}
