//! Get-or-create store for canonical nodes within one build.

use crate::canonical::{choose_better_label, normalize, resolve_key, MatchConfig};
use crate::model::CanonicalNode;
use indexmap::IndexMap;

/// Canonical nodes of a single build, keyed in first-seen order.
///
/// The ordering is load-bearing: [`resolve_key`] scans keys in creation order
/// and takes the first fuzzy match.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    config: MatchConfig,
    nodes: IndexMap<String, CanonicalNode>,
}

impl NodeRegistry {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            nodes: IndexMap::new(),
        }
    }

    pub fn core(&self, label: &str) -> String {
        normalize(label, &self.config)
    }

    /// Resolve `label` to its canonical node, creating it on first sight and
    /// re-arbitrating the display label otherwise.
    ///
    /// Returns `None` when the label normalizes to an empty core.
    pub fn get_or_create(&mut self, label: &str) -> Option<&CanonicalNode> {
        self.get_or_create_with_members(label, &[])
    }

    /// Like [`Self::get_or_create`], additionally recording group member ids
    /// (diagram supernodes). Members already present are not duplicated.
    pub fn get_or_create_with_members(
        &mut self,
        label: &str,
        members: &[String],
    ) -> Option<&CanonicalNode> {
        let core = self.core(label);
        if core.is_empty() {
            return None;
        }
        let key = resolve_key(
            &core,
            self.nodes.keys().map(String::as_str),
            self.config.min_overlap,
        );

        let node = self
            .nodes
            .entry(key.clone())
            .or_insert_with(|| CanonicalNode {
                id: key.clone(),
                label: label.to_string(),
                member_ids: Vec::new(),
            });

        let better = choose_better_label(&node.label, label, &key);
        if better != node.label {
            node.label = better.to_string();
        }
        for member in members {
            if !node.member_ids.contains(member) {
                node.member_ids.push(member.clone());
            }
        }
        Some(node)
    }

    pub fn get(&self, id: &str) -> Option<&CanonicalNode> {
        self.nodes.get(id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CanonicalNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn into_nodes(self) -> Vec<CanonicalNode> {
        self.nodes.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> NodeRegistry {
        NodeRegistry::new(MatchConfig::default())
    }

    #[test]
    fn numbered_variant_merges_into_base() {
        let mut reg = registry();
        let a = reg.get_or_create("PIP").unwrap().id.clone();
        let b = reg.get_or_create("PIP3").unwrap().id.clone();
        assert_eq!(a, "PIP");
        assert_eq!(b, "PIP");
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("PIP").unwrap().label, "PIP");
    }

    #[test]
    fn label_is_rearbitrated_on_each_mention() {
        let mut reg = registry();
        reg.get_or_create("AKT");
        reg.get_or_create("AKT serine/threonine kinase");
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("AKT").unwrap().label, "AKT serine/threonine kinase");
    }

    #[test]
    fn empty_core_is_rejected() {
        let mut reg = registry();
        assert!(reg.get_or_create(" ?? ").is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn unrelated_labels_get_distinct_keys() {
        let mut reg = registry();
        reg.get_or_create("PTEN");
        reg.get_or_create("TP53");
        reg.get_or_create("AK");
        reg.get_or_create("AKT1");
        let keys: Vec<&str> = reg.keys().collect();
        assert_eq!(keys, vec!["PTEN", "TP53", "AK", "AKT1"]);
    }

    #[test]
    fn members_accumulate_without_duplicates() {
        let mut reg = registry();
        let members = vec!["n1".to_string(), "n2".to_string()];
        reg.get_or_create_with_members("AKT1 / AKT2", &members);
        reg.get_or_create_with_members("AKT1 / AKT2", &members[1..]);
        let node = reg.get("AKT1").unwrap();
        assert_eq!(node.member_ids, vec!["n1", "n2"]);
        assert_eq!(node.label, "AKT1 / AKT2");
    }
}
