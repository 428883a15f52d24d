//! Build configuration.

use crate::canonical::MatchConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PLACEHOLDER_URL: &str = "#";
pub const NO_OUTGOING_LABEL: &str = "(no outgoing interaction)";
pub const CUSTOM_EDGE_KIND: &str = "custom";

/// A curated interaction added on top of the source data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEdge {
    pub source: String,
    pub target: String,
}

impl CustomEdge {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub matching: MatchConfig,
    /// URL used in table rows when a label has no known URI.
    pub placeholder_url: String,
    /// Target text of the synthetic row for nodes without outgoing edges.
    pub no_outgoing_label: String,
    /// Extra interactions per pathway id.
    pub custom_edges: BTreeMap<String, Vec<CustomEdge>>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            matching: MatchConfig::default(),
            placeholder_url: PLACEHOLDER_URL.to_string(),
            no_outgoing_label: NO_OUTGOING_LABEL.to_string(),
            custom_edges: BTreeMap::new(),
        }
    }
}

impl BuildConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn custom_edges_for(&self, pathway_id: &str) -> &[CustomEdge] {
        self.custom_edges
            .get(pathway_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
