//! Row, node, edge and table types shared by every build stage.
//!
//! Serialized names follow the renderer contract: `nodes`, `links` and
//! `tableRows`, with camelCase fields.

use serde::{Deserialize, Serialize};

// ============================================================================
// Input
// ============================================================================

/// One interaction as delivered by a source adapter.
///
/// Source adapters validate their own records before producing a `RawRow`;
/// everything except the two URIs is optional. Empty URIs are treated as
/// missing by [`crate::RowDeduplicator`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRow {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_label: Option<String>,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    /// Raw member ids when the source is a diagram group supernode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_members: Vec<String>,
    /// Raw member ids when the target is a diagram group supernode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_members: Vec<String>,
}

impl RawRow {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn with_labels(mut self, source_label: &str, target_label: &str) -> Self {
        self.source_label = Some(source_label.to_string());
        self.target_label = Some(target_label.to_string());
        self
    }

    pub fn with_interaction_type(mut self, kind: &str) -> Self {
        self.interaction_type = Some(kind.to_string());
        self
    }
}

// ============================================================================
// Output
// ============================================================================

/// A merged entity. `label` is re-arbitrated on every mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalNode {
    pub id: String,
    pub label: String,
    /// Raw diagram member ids; only populated for group supernodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub member_ids: Vec<String>,
}

/// Directed edge, unique by `(source_id, target_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectedEdge {
    #[serde(rename = "source")]
    pub source_id: String,
    #[serde(rename = "target")]
    pub target_id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Display projection of an edge, or of a node without outgoing edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub source: String,
    pub target: String,
    pub url: String,
    pub source_id: String,
    /// Empty for the synthetic "no outgoing interaction" row.
    pub target_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub nodes: Vec<CanonicalNode>,
    pub links: Vec<DirectedEdge>,
    pub table_rows: Vec<TableRow>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&CanonicalNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn has_edge(&self, source_id: &str, target_id: &str) -> bool {
        self.links
            .iter()
            .any(|e| e.source_id == source_id && e.target_id == target_id)
    }

    /// Table rows whose source is `node_id` (the renderer's click-to-highlight lookup).
    pub fn rows_for_node<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a TableRow> {
        self.table_rows.iter().filter(move |r| r.source_id == node_id)
    }
}

/// Diagnostic counters for one pathway build. None of these are errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    pub raw_rows: usize,
    pub deduplicated_rows: usize,
    /// Rows dropped for a missing URI, a missing label or an empty core.
    pub dropped_rows: usize,
    pub duplicate_edges: usize,
    /// Diagram interactions whose endpoints could not be resolved.
    pub skipped_interactions: usize,
    pub custom_edges: usize,
}
