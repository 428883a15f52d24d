//! Cross-pathway frequency accumulation.
//!
//! Counts how many *distinct pathways* each node has appeared in. The store is
//! meant to live for the whole process (see [`crate::Session`]) and is passed
//! into every build explicitly.

use crate::error::{CoreError, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Fixed column of every chart row; no pathway may use it as its id.
pub const GENE_COLUMN: &str = "gene";

/// Reject pathway ids that would collide with [`GENE_COLUMN`] in a
/// [`FrequencyRow`].
pub fn validate_pathway_id(pathway_id: &str) -> Result<()> {
    if pathway_id == GENE_COLUMN {
        return Err(CoreError::ReservedPathwayId(pathway_id.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyRecord {
    pub node_id: String,
    pathways_seen: IndexSet<String>,
}

impl FrequencyRecord {
    fn new(node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            pathways_seen: IndexSet::new(),
        }
    }

    /// Always the size of the pathway set.
    pub fn count(&self) -> usize {
        self.pathways_seen.len()
    }

    pub fn pathways(&self) -> impl Iterator<Item = &str> {
        self.pathways_seen.iter().map(String::as_str)
    }

    pub fn seen_in(&self, pathway_id: &str) -> bool {
        self.pathways_seen.contains(pathway_id)
    }
}

/// One row of the frequency chart: `{"gene": id, "<pathway>": 1, ...}`.
///
/// Pathway ids share the object with `gene`, so the store never records a
/// pathway named [`GENE_COLUMN`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyRow {
    pub gene: String,
    #[serde(flatten)]
    pub pathways: IndexMap<String, u8>,
}

impl FrequencyRow {
    pub fn total(&self) -> usize {
        self.pathways.values().map(|v| *v as usize).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrequencyStore {
    records: IndexMap<String, FrequencyRecord>,
    loaded: IndexSet<String>,
}

impl FrequencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note that `node_id` appears in `pathway_id`.
    ///
    /// No-op once the pathway is marked loaded, so rebuilding a pathway never
    /// changes any record. Reserved pathway ids are ignored.
    pub fn record(&mut self, node_id: &str, pathway_id: &str) {
        if self.loaded.contains(pathway_id) {
            return;
        }
        if validate_pathway_id(pathway_id).is_err() {
            tracing::warn!(pathway = pathway_id, "reserved pathway id not recorded");
            return;
        }
        self.records
            .entry(node_id.to_string())
            .or_insert_with(|| FrequencyRecord::new(node_id))
            .pathways_seen
            .insert(pathway_id.to_string());
    }

    /// Call only after the pathway's whole graph has been built.
    pub fn mark_loaded(&mut self, pathway_id: &str) {
        self.loaded.insert(pathway_id.to_string());
    }

    pub fn is_loaded(&self, pathway_id: &str) -> bool {
        self.loaded.contains(pathway_id)
    }

    pub fn get(&self, node_id: &str) -> Option<&FrequencyRecord> {
        self.records.get(node_id)
    }

    pub fn count(&self, node_id: &str) -> usize {
        self.get(node_id).map_or(0, FrequencyRecord::count)
    }

    pub fn records(&self) -> impl Iterator<Item = &FrequencyRecord> {
        self.records.values()
    }

    pub fn loaded_pathways(&self) -> impl Iterator<Item = &str> {
        self.loaded.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Chart rows in first-seen node order.
    pub fn table(&self) -> Vec<FrequencyRow> {
        self.records
            .values()
            .map(|record| FrequencyRow {
                gene: record.node_id.clone(),
                pathways: record.pathways().map(|p| (p.to_string(), 1)).collect(),
            })
            .collect()
    }

    /// Chart rows by descending pathway count; ties keep first-seen order.
    pub fn ranked(&self) -> Vec<FrequencyRow> {
        let mut rows = self.table();
        rows.sort_by(|a, b| b.total().cmp(&a.total()));
        rows
    }

    pub fn reset(&mut self) {
        self.records.clear();
        self.loaded.clear();
    }
}
