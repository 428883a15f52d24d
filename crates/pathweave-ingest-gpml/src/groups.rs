//! Group collapsing: diagram groups become supernodes.
//!
//! 1. Every node with a `GroupRef` is bucketed by that reference (member ids,
//!    member URIs and the `" / "`-joined member labels).
//! 2. A `<Group GroupId GraphId>` declaration renames a bucket to its
//!    graph-level id when the two differ; interactions reference that id.
//! 3. Interaction endpoints naming a grouped member are redirected to the
//!    bucket's id before resolution.

use crate::parse::{DiagramNode, GroupDecl};
use indexmap::IndexMap;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub id: String,
    pub member_ids: Vec<String>,
    pub label: String,
    pub member_uris: Vec<String>,
}

impl GroupRecord {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            member_ids: Vec::new(),
            label: String::new(),
            member_uris: Vec::new(),
        }
    }

    /// Comma-joined member URIs, or the group id when no member has one.
    pub fn uri(&self) -> String {
        if self.member_uris.is_empty() {
            self.id.clone()
        } else {
            self.member_uris.join(",")
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroupCollapser {
    /// Keyed by the `GroupRef` the members carry.
    groups: IndexMap<String, GroupRecord>,
    /// Renamed group id -> `GroupRef` key.
    renamed: HashMap<String, String>,
}

impl GroupCollapser {
    pub fn new(nodes: &IndexMap<String, DiagramNode>, declarations: &[GroupDecl]) -> Self {
        let mut groups: IndexMap<String, GroupRecord> = IndexMap::new();
        for node in nodes.values() {
            let Some(group_ref) = node.group_ref.as_deref() else {
                continue;
            };
            let group = groups
                .entry(group_ref.to_string())
                .or_insert_with(|| GroupRecord::new(group_ref));
            if !group.member_ids.is_empty() {
                group.label.push_str(" / ");
            }
            group.label.push_str(&node.label);
            group.member_ids.push(node.id.clone());
            if let Some(uri) = &node.uri {
                group.member_uris.push(uri.clone());
            }
        }

        let mut renamed = HashMap::new();
        for decl in declarations {
            let (Some(group), Some(graph_id)) =
                (groups.get_mut(&decl.group_id), decl.graph_id.as_deref())
            else {
                continue;
            };
            if graph_id != decl.group_id {
                group.id = graph_id.to_string();
                renamed.insert(graph_id.to_string(), decl.group_id.clone());
            }
        }

        tracing::debug!(groups = groups.len(), renamed = renamed.len(), "collapsed groups");
        Self { groups, renamed }
    }

    /// Endpoint to use for `reference`: the group id if it names a grouped member.
    pub fn redirect<'a>(
        &'a self,
        nodes: &'a IndexMap<String, DiagramNode>,
        reference: &'a str,
    ) -> &'a str {
        nodes
            .get(reference)
            .and_then(|node| node.group_ref.as_deref())
            .and_then(|group_ref| self.groups.get(group_ref))
            .map_or(reference, |group| group.id.as_str())
    }

    /// Group addressed by its final id or by its `GroupRef`.
    pub fn resolve(&self, reference: &str) -> Option<&GroupRecord> {
        let key = self.renamed.get(reference).map_or(reference, String::as_str);
        self.groups.get(key)
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupRecord> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
