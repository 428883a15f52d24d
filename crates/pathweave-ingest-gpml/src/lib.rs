//! Pathway diagram ingestion for Pathweave (boundary adapter).
//!
//! Reads a GPML document and turns its interactions into core [`RawRow`]s:
//!
//! - `DataNode` elements (with an optional `Xref`) become diagram nodes,
//! - `Group` declarations and `GroupRef` attributes become supernodes
//!   (see [`groups`]),
//! - each `Interaction` contributes one row from its first two referenced
//!   points.
//!
//! Element and attribute names are matched on their local name, so documents
//! with or without a namespace prefix parse the same way.

pub mod groups;
pub mod parse;

pub use groups::{GroupCollapser, GroupRecord};
pub use parse::{parse_diagram, Diagram, DiagramInteraction, DiagramNode, GroupDecl, Point};

use pathweave_core::RawRow;
use serde::{Deserialize, Serialize};

pub const GROUP_TYPE: &str = "Group";
pub const DEFAULT_NODE_TYPE: &str = "DataNode";

pub type Result<T> = std::result::Result<T, GpmlError>;

#[derive(Debug, thiserror::Error)]
pub enum GpmlError {
    #[error("XML syntax error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("document has no <Pathway> root element")]
    MissingRoot,
}

// ============================================================================
// Options
// ============================================================================

/// URI construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpmlOptions {
    pub revision: String,
    pub identifiers_base: String,
    pub interaction_base: String,
}

impl Default for GpmlOptions {
    fn default() -> Self {
        Self {
            revision: "0".to_string(),
            identifiers_base: "https://identifiers.org".to_string(),
            interaction_base: "http://rdf.wikipathways.org/Pathway".to_string(),
        }
    }
}

impl GpmlOptions {
    pub fn xref_uri(&self, database: &str, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.identifiers_base.trim_end_matches('/'),
            database.to_lowercase(),
            id
        )
    }

    pub fn interaction_uri(&self, pathway_id: &str, interaction_id: &str) -> String {
        format!(
            "{}/{}_r{}/WP/Interaction/{}",
            self.interaction_base.trim_end_matches('/'),
            pathway_id,
            self.revision,
            interaction_id
        )
    }
}

// ============================================================================
// Rows
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagramRows {
    pub rows: Vec<RawRow>,
    /// Interactions with fewer than two references or an unresolved endpoint.
    pub skipped_interactions: usize,
    pub title: Option<String>,
}

/// One resolved interaction endpoint: either a plain node or a supernode.
struct Endpoint {
    uri: String,
    label: String,
    kind: String,
    members: Vec<String>,
}

fn resolve_endpoint(diagram: &Diagram, groups: &GroupCollapser, reference: &str) -> Option<Endpoint> {
    let reference = groups.redirect(&diagram.nodes, reference);
    if let Some(node) = diagram.nodes.get(reference) {
        return Some(Endpoint {
            uri: node.uri.clone().unwrap_or_else(|| node.id.clone()),
            label: node.label.clone(),
            kind: node.kind.clone(),
            members: Vec::new(),
        });
    }
    let group = groups.resolve(reference)?;
    Some(Endpoint {
        uri: group.uri(),
        label: group.label.clone(),
        kind: GROUP_TYPE.to_string(),
        members: group.member_ids.clone(),
    })
}

/// Convert a parsed diagram into rows, collapsing groups first.
pub fn diagram_rows(diagram: &Diagram, pathway_id: &str, options: &GpmlOptions) -> DiagramRows {
    let groups = GroupCollapser::new(&diagram.nodes, &diagram.groups);
    let mut out = DiagramRows {
        title: diagram.title.clone(),
        ..DiagramRows::default()
    };

    for interaction in &diagram.interactions {
        let mut refs = interaction
            .points
            .iter()
            .filter(|p| p.graph_ref.as_deref().is_some_and(|r| !r.is_empty()));
        let (Some(from), Some(to)) = (refs.next(), refs.next()) else {
            tracing::debug!(interaction = %interaction.id, "interaction without two endpoints");
            out.skipped_interactions += 1;
            continue;
        };
        let from_ref = from.graph_ref.as_deref().unwrap_or_default();
        let to_ref = to.graph_ref.as_deref().unwrap_or_default();

        let (Some(source), Some(target)) = (
            resolve_endpoint(diagram, &groups, from_ref),
            resolve_endpoint(diagram, &groups, to_ref),
        ) else {
            tracing::debug!(
                interaction = %interaction.id,
                source = from_ref,
                target = to_ref,
                "unresolved interaction endpoint"
            );
            out.skipped_interactions += 1;
            continue;
        };

        out.rows.push(RawRow {
            source: source.uri,
            source_label: Some(source.label),
            target: target.uri,
            target_label: Some(target.label),
            interaction: Some(options.interaction_uri(pathway_id, &interaction.id)),
            interaction_label: None,
            interaction_type: to.arrow_head.clone(),
            source_type: Some(source.kind),
            target_type: Some(target.kind),
            source_members: source.members,
            target_members: target.members,
        });
    }

    if out.skipped_interactions > 0 {
        tracing::warn!(
            pathway = pathway_id,
            skipped = out.skipped_interactions,
            "skipped diagram interactions"
        );
    }
    out
}

/// Parse `xml` and convert it in one step.
pub fn parse_rows(xml: &str, pathway_id: &str, options: &GpmlOptions) -> Result<DiagramRows> {
    let diagram = parse_diagram(xml, options)?;
    Ok(diagram_rows(&diagram, pathway_id, options))
}
