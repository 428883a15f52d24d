//! Label-level edge set and display table projection.

use crate::model::{CanonicalNode, DirectedEdge, Graph, TableRow};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Deduplicated directed edges, in insertion order, with their display table.
///
/// Uniqueness is exact on `(source_id, target_id)`. The first edge for a pair
/// is kept as-is; a later one with a different label or type is dropped, not
/// merged.
///
/// A table row is written when its edge is inserted and carries the endpoint
/// labels of that moment, so a later label merge does not rewrite it. The URL
/// is looked up by the source label and falls back to the placeholder.
#[derive(Debug)]
pub struct EdgeBuilder<'a> {
    options: TableOptions<'a>,
    edges: IndexMap<(String, String), DirectedEdge>,
    table_rows: Vec<TableRow>,
    duplicates: usize,
}

/// Table settings for [`EdgeBuilder`].
#[derive(Debug, Clone, Copy)]
pub struct TableOptions<'a> {
    pub urls: &'a HashMap<String, String>,
    pub placeholder_url: &'a str,
    pub no_outgoing_label: &'a str,
}

impl TableOptions<'_> {
    fn url_for(&self, label: &str) -> String {
        self.urls
            .get(label)
            .cloned()
            .unwrap_or_else(|| self.placeholder_url.to_string())
    }
}

impl<'a> EdgeBuilder<'a> {
    pub fn new(options: TableOptions<'a>) -> Self {
        Self {
            options,
            edges: IndexMap::new(),
            table_rows: Vec::new(),
            duplicates: 0,
        }
    }

    /// Insert the edge and its table row unless the `(source, target)` pair
    /// already exists.
    pub fn add_edge(
        &mut self,
        source: &CanonicalNode,
        target: &CanonicalNode,
        label: &str,
        kind: &str,
    ) -> bool {
        let key = (source.id.clone(), target.id.clone());
        if self.edges.contains_key(&key) {
            tracing::debug!(edge = ?key, "skip duplicate edge");
            self.duplicates += 1;
            return false;
        }
        self.table_rows.push(TableRow {
            source: source.label.clone(),
            target: target.label.clone(),
            url: self.options.url_for(&source.label),
            source_id: source.id.clone(),
            target_id: target.id.clone(),
        });
        self.edges.insert(
            key,
            DirectedEdge {
                source_id: source.id.clone(),
                target_id: target.id.clone(),
                label: label.to_string(),
                kind: kind.to_string(),
            },
        );
        true
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Assemble the graph, appending a synthetic row for every node that has
    /// no outgoing edge. Those rows use the node's final label.
    pub fn finish(self, nodes: Vec<CanonicalNode>) -> Graph {
        let links: Vec<DirectedEdge> = self.edges.into_values().collect();
        let mut table_rows = self.table_rows;

        let has_outgoing: HashSet<&str> = links.iter().map(|e| e.source_id.as_str()).collect();
        for node in &nodes {
            if has_outgoing.contains(node.id.as_str()) {
                continue;
            }
            table_rows.push(TableRow {
                source: node.label.clone(),
                target: self.options.no_outgoing_label.to_string(),
                url: self.options.url_for(&node.label),
                source_id: node.id.clone(),
                target_id: String::new(),
            });
        }

        Graph {
            nodes,
            links,
            table_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, label: &str) -> CanonicalNode {
        CanonicalNode {
            id: id.to_string(),
            label: label.to_string(),
            member_ids: Vec::new(),
        }
    }

    fn options(urls: &HashMap<String, String>) -> TableOptions<'_> {
        TableOptions {
            urls,
            placeholder_url: "#",
            no_outgoing_label: "(no outgoing interaction)",
        }
    }

    #[test]
    fn first_edge_for_pair_wins() {
        let urls = HashMap::new();
        let (a, b) = (node("A", "a"), node("B", "b"));
        let mut edges = EdgeBuilder::new(options(&urls));
        assert!(edges.add_edge(&a, &b, "binds", "Binding"));
        assert!(!edges.add_edge(&a, &b, "inhibits", "Inhibition"));
        assert!(edges.add_edge(&b, &a, "", ""));
        assert_eq!(edges.len(), 2);
        assert_eq!(edges.duplicates(), 1);

        let graph = edges.finish(vec![a, b]);
        assert_eq!(graph.links[0].kind, "Binding");
        assert_eq!(graph.links[0].label, "binds");
        assert_eq!(graph.table_rows.len(), 2);
    }

    #[test]
    fn isolated_nodes_get_synthetic_rows() {
        let mut urls = HashMap::new();
        urls.insert("Akt".to_string(), "https://identifiers.org/ncbigene/207".to_string());
        let (a, b, c) = (node("A", "Akt"), node("B", "Pten"), node("C", "Pip"));
        let mut edges = EdgeBuilder::new(options(&urls));
        edges.add_edge(&a, &b, "", "");

        let graph = edges.finish(vec![a, b, c]);

        assert_eq!(graph.table_rows.len(), 3);
        assert_eq!(graph.table_rows[0].url, "https://identifiers.org/ncbigene/207");
        assert_eq!(graph.table_rows[0].target, "Pten");
        let lonely: Vec<&TableRow> = graph
            .table_rows
            .iter()
            .filter(|r| r.target_id.is_empty())
            .collect();
        assert_eq!(lonely.len(), 2);
        assert!(lonely.iter().all(|r| r.target == "(no outgoing interaction)"));
        assert!(lonely.iter().all(|r| r.url == "#"));

        for n in &graph.nodes {
            assert!(graph.rows_for_node(&n.id).next().is_some());
        }
    }

    #[test]
    fn rows_keep_labels_from_insertion_time() {
        let mut urls = HashMap::new();
        urls.insert("AKT".to_string(), "u1".to_string());
        urls.insert("AKT serine kinase".to_string(), "u9".to_string());
        let mut edges = EdgeBuilder::new(options(&urls));
        edges.add_edge(&node("AKT", "AKT"), &node("PTEN", "PTEN"), "", "");
        edges.add_edge(&node("AKT", "AKT serine kinase"), &node("TP53", "TP53"), "", "");

        let graph = edges.finish(vec![
            node("AKT", "AKT serine kinase"),
            node("PTEN", "PTEN"),
            node("TP53", "TP53"),
        ]);
        assert_eq!(graph.table_rows[0].source, "AKT");
        assert_eq!(graph.table_rows[0].url, "u1");
        assert_eq!(graph.table_rows[1].source, "AKT serine kinase");
        assert_eq!(graph.table_rows[1].url, "u9");
    }
}
