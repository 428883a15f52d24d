//! One pathway build: raw rows in, canonical graph + layers out.

use crate::config::{BuildConfig, CUSTOM_EDGE_KIND};
use crate::dedup::{label_url_map, RowDeduplicator};
use crate::edges::{EdgeBuilder, TableOptions};
use crate::frequency::FrequencyStore;
use crate::layering::assign_layers;
use crate::model::{BuildStats, Graph, RawRow};
use crate::registry::NodeRegistry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutput {
    pub pathway_id: String,
    pub graph: Graph,
    /// Layer per node id, in node order.
    pub layers: IndexMap<String, usize>,
    pub stats: BuildStats,
}

// ============================================================================
// GraphBuilder
// ============================================================================

/// Label-level assembly over already URI-deduplicated rows.
///
/// Owns the per-build [`NodeRegistry`] and [`EdgeBuilder`]; nothing outside
/// the build touches them. `urls` maps display labels to entity URLs for the
/// table rows.
#[derive(Debug)]
pub struct GraphBuilder<'c> {
    registry: NodeRegistry,
    edges: EdgeBuilder<'c>,
    dropped_rows: usize,
    custom_edges: usize,
}

impl<'c> GraphBuilder<'c> {
    pub fn new(config: &'c BuildConfig, urls: &'c HashMap<String, String>) -> Self {
        Self {
            registry: NodeRegistry::new(config.matching.clone()),
            edges: EdgeBuilder::new(TableOptions {
                urls,
                placeholder_url: &config.placeholder_url,
                no_outgoing_label: &config.no_outgoing_label,
            }),
            dropped_rows: 0,
            custom_edges: 0,
        }
    }

    /// Resolve both endpoints and add the edge. Returns `false` when the row
    /// was dropped (missing label or empty core) or the edge already existed.
    pub fn add_row(&mut self, row: &RawRow) -> bool {
        let (Some(source_label), Some(target_label)) = (&row.source_label, &row.target_label)
        else {
            self.dropped_rows += 1;
            return false;
        };
        let label = row.interaction_label.as_deref().unwrap_or_default();
        let kind = row.interaction_type.as_deref().unwrap_or_default();
        self.connect(
            source_label,
            &row.source_members,
            target_label,
            &row.target_members,
            label,
            kind,
        )
    }

    /// Add a curated edge between two labels, typed `"custom"`.
    pub fn add_custom_edge(&mut self, source_label: &str, target_label: &str) -> bool {
        let added = self.connect(
            source_label,
            &[],
            target_label,
            &[],
            CUSTOM_EDGE_KIND,
            CUSTOM_EDGE_KIND,
        );
        if added {
            self.custom_edges += 1;
        }
        added
    }

    fn connect(
        &mut self,
        source_label: &str,
        source_members: &[String],
        target_label: &str,
        target_members: &[String],
        label: &str,
        kind: &str,
    ) -> bool {
        // Check both cores first so a half-usable row creates no node.
        if self.registry.core(source_label).is_empty() || self.registry.core(target_label).is_empty()
        {
            tracing::debug!(source_label, target_label, "drop row with empty core");
            self.dropped_rows += 1;
            return false;
        }
        let source_id = match self
            .registry
            .get_or_create_with_members(source_label, source_members)
        {
            Some(node) => node.id.clone(),
            None => return false,
        };
        let target_id = match self
            .registry
            .get_or_create_with_members(target_label, target_members)
        {
            Some(node) => node.id.clone(),
            None => return false,
        };
        // Labels as they stand after both lookups; the target may have renamed the source.
        match (self.registry.get(&source_id), self.registry.get(&target_id)) {
            (Some(source), Some(target)) => self.edges.add_edge(source, target, label, kind),
            _ => false,
        }
    }

    pub fn finish(self) -> (Graph, BuildStats) {
        let stats = BuildStats {
            dropped_rows: self.dropped_rows,
            duplicate_edges: self.edges.duplicates(),
            custom_edges: self.custom_edges,
            ..BuildStats::default()
        };
        let graph = self.edges.finish(self.registry.into_nodes());
        (graph, stats)
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Build the canonical graph for one pathway and fold it into `frequency`.
///
/// `rows` is the merged input of every source, in source order. The pathway
/// is marked loaded only after the whole graph exists, so a second build of
/// the same pathway leaves every frequency record untouched.
pub fn build_pathway(
    pathway_id: &str,
    rows: Vec<RawRow>,
    config: &BuildConfig,
    frequency: &mut FrequencyStore,
) -> BuildOutput {
    let _span = tracing::info_span!("build_pathway", pathway = %pathway_id).entered();

    let raw_rows = rows.len();
    let urls = label_url_map(&rows);

    let mut dedup = RowDeduplicator::new();
    let rows: Vec<RawRow> = rows.into_iter().filter_map(|row| dedup.push(row)).collect();

    let mut builder = GraphBuilder::new(config, &urls);
    for row in &rows {
        builder.add_row(row);
    }
    for custom in config.custom_edges_for(pathway_id) {
        builder.add_custom_edge(&custom.source, &custom.target);
    }
    let (graph, mut stats) = builder.finish();
    stats.raw_rows = raw_rows;
    stats.deduplicated_rows = rows.len();
    stats.dropped_rows += dedup.missing_uri();

    for node in &graph.nodes {
        frequency.record(&node.id, pathway_id);
    }
    frequency.mark_loaded(pathway_id);

    let layers = assign_layers(
        graph.nodes.iter().map(|n| n.id.as_str()),
        graph
            .links
            .iter()
            .map(|e| (e.source_id.as_str(), e.target_id.as_str())),
    );

    tracing::info!(
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        dropped = stats.dropped_rows,
        duplicate_edges = stats.duplicate_edges,
        "pathway graph built"
    );

    BuildOutput {
        pathway_id: pathway_id.to_string(),
        graph,
        layers,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CustomEdge;

    fn row(s: &str, sl: &str, t: &str, tl: &str) -> RawRow {
        RawRow::new(s, t).with_labels(sl, tl)
    }

    #[test]
    fn numbered_variant_becomes_self_loop_on_base() {
        let config = BuildConfig::default();
        let mut freq = FrequencyStore::new();
        let out = build_pathway("P", vec![row("u1", "PIP", "u2", "PIP3")], &config, &mut freq);
        assert_eq!(out.graph.nodes.len(), 1);
        assert_eq!(out.graph.nodes[0].id, "PIP");
        assert_eq!(out.graph.nodes[0].label, "PIP");
        assert!(out.graph.has_edge("PIP", "PIP"));
    }

    #[test]
    fn rows_without_uri_or_core_are_dropped() {
        let config = BuildConfig::default();
        let mut freq = FrequencyStore::new();
        let rows = vec![
            row("u1", "--", "u2", "PTEN"),
            row("u3", "AKT1", "u4", "PTEN"),
            RawRow::new("", "u4").with_labels("X", "PTEN"),
        ];
        let out = build_pathway("P", rows, &config, &mut freq);
        assert_eq!(out.stats.raw_rows, 3);
        assert_eq!(out.stats.deduplicated_rows, 2);
        assert_eq!(out.stats.dropped_rows, 2);
        let ids: Vec<&str> = out.graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["AKT1", "PTEN"]);
    }

    #[test]
    fn unlabeled_first_row_still_yields_its_interaction() {
        let config = BuildConfig::default();
        let mut freq = FrequencyStore::new();
        let rows = vec![
            RawRow::new("uri:a", "uri:b"),
            RawRow::new("uri:a", "uri:b").with_labels("AKT1", "PTEN"),
        ];
        let out = build_pathway("P", rows, &config, &mut freq);
        assert_eq!(out.stats.dropped_rows, 0);
        assert_eq!(out.graph.links.len(), 1);
        let row = &out.graph.table_rows[0];
        assert_eq!(row.source, "uri:a");
        assert_eq!(row.target, "uri:b");
        assert_eq!(row.url, "#");
    }

    #[test]
    fn label_level_duplicates_keep_first_metadata() {
        let config = BuildConfig::default();
        let mut freq = FrequencyStore::new();
        let rows = vec![
            row("u1", "AKT1", "u2", "PTEN").with_interaction_type("Binding"),
            row("u3", "Akt-1", "u2", "PTEN").with_interaction_type("Inhibition"),
        ];
        let out = build_pathway("P", rows, &config, &mut freq);
        assert_eq!(out.graph.links.len(), 1);
        assert_eq!(out.graph.links[0].kind, "Binding");
        assert_eq!(out.stats.duplicate_edges, 1);
    }

    #[test]
    fn table_urls_follow_source_label() {
        let config = BuildConfig::default();
        let mut freq = FrequencyStore::new();
        let rows = vec![row(
            "https://identifiers.org/ncbigene/207",
            "AKT1",
            "https://identifiers.org/ncbigene/5728",
            "PTEN",
        )];
        let out = build_pathway("P", rows, &config, &mut freq);
        let akt = out.graph.rows_for_node("AKT1").next().unwrap();
        assert_eq!(akt.url, "https://identifiers.org/ncbigene/207");
        let pten = out.graph.rows_for_node("PTEN").next().unwrap();
        assert_eq!(pten.target, "(no outgoing interaction)");
        assert_eq!(pten.url, "https://identifiers.org/ncbigene/5728");
    }

    #[test]
    fn table_rows_keep_the_url_of_their_own_row() {
        let config = BuildConfig::default();
        let mut freq = FrequencyStore::new();
        let rows = vec![
            row("u1", "AKT", "u2", "PTEN"),
            row("u9", "AKT serine kinase", "u3", "TP53"),
        ];
        let out = build_pathway("P", rows, &config, &mut freq);
        assert_eq!(out.graph.node("AKT").unwrap().label, "AKT serine kinase");

        let pten = out
            .graph
            .table_rows
            .iter()
            .find(|r| r.target == "PTEN")
            .unwrap();
        assert_eq!(pten.source, "AKT");
        assert_eq!(pten.url, "u1");
        let tp53 = out
            .graph
            .table_rows
            .iter()
            .find(|r| r.target == "TP53")
            .unwrap();
        assert_eq!(tp53.source, "AKT serine kinase");
        assert_eq!(tp53.url, "u9");
    }

    #[test]
    fn custom_edges_are_resolved_and_typed() {
        let mut config = BuildConfig::default();
        config.custom_edges.insert(
            "WP17".to_string(),
            vec![CustomEdge::new("PIP", "AKT-1"), CustomEdge::new("ProteinA", "ProteinB")],
        );
        let mut freq = FrequencyStore::new();
        let rows = vec![row("u1", "PIP3", "u2", "AKT1")];
        let out = build_pathway("WP17", rows, &config, &mut freq);

        assert_eq!(out.stats.custom_edges, 1);
        assert_eq!(out.stats.duplicate_edges, 1);
        assert!(out.graph.has_edge("PROTEINA", "PROTEINB"));
        let custom = out
            .graph
            .links
            .iter()
            .find(|e| e.source_id == "PROTEINA")
            .unwrap();
        assert_eq!(custom.kind, "custom");
        // PIP -> AKT-1 resolves onto the existing PIP3 -> AKT1 edge.
        assert_eq!(out.graph.links.len(), 2);
        assert_eq!(out.graph.node("PIP3").unwrap().label, "PIP3");
    }

    #[test]
    fn build_records_frequency_and_marks_loaded() {
        let config = BuildConfig::default();
        let mut freq = FrequencyStore::new();
        build_pathway("P1", vec![row("a", "A", "b", "B")], &config, &mut freq);
        assert!(freq.is_loaded("P1"));
        assert_eq!(freq.count("A"), 1);
        assert_eq!(freq.count("B"), 1);
    }

    #[test]
    fn layers_cover_every_node() {
        let config = BuildConfig::default();
        let mut freq = FrequencyStore::new();
        let rows = vec![
            row("a", "AAA", "b", "BBB"),
            row("b", "BBB", "c", "CCC"),
            row("d", "DDD", "d2", "EEE"),
        ];
        let out = build_pathway("P", rows, &config, &mut freq);
        assert_eq!(out.layers.len(), out.graph.nodes.len());
        assert_eq!(out.layers["CCC"], 2);
        assert_eq!(out.layers["EEE"], 1);
    }
}
