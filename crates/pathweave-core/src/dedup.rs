//! URI-level row deduplication and the label → URL lookup.

use crate::model::RawRow;
use std::collections::{HashMap, HashSet};

/// Collapses raw rows that describe the same `(source URI, target URI)` pair.
///
/// The first non-empty label observed for a URI becomes its label for every
/// later row, whatever those rows carry. A URI first seen without a label is
/// labeled with the URI itself, so every kept row has both labels. The first
/// row for a pair is kept (with canonical labels substituted); later rows for
/// the pair are dropped together with their interaction metadata.
#[derive(Debug, Default)]
pub struct RowDeduplicator {
    canonical_labels: HashMap<String, String>,
    seen_pairs: HashSet<(String, String)>,
    missing_uri: usize,
    duplicates: usize,
}

impl RowDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the pass over a full row set.
    pub fn run(rows: impl IntoIterator<Item = RawRow>) -> Vec<RawRow> {
        let mut dedup = Self::new();
        rows.into_iter().filter_map(|row| dedup.push(row)).collect()
    }

    /// Feed one row; returns it (with canonical labels) if it is the first for its pair.
    pub fn push(&mut self, mut row: RawRow) -> Option<RawRow> {
        if row.source.is_empty() || row.target.is_empty() {
            self.missing_uri += 1;
            return None;
        }

        row.source_label = Some(self.canonical_label(&row.source, row.source_label.take()));
        row.target_label = Some(self.canonical_label(&row.target, row.target_label.take()));

        let pair = (row.source.clone(), row.target.clone());
        if !self.seen_pairs.insert(pair) {
            tracing::debug!(source = %row.source, target = %row.target, "skip duplicate row");
            self.duplicates += 1;
            return None;
        }
        Some(row)
    }

    fn canonical_label(&mut self, uri: &str, observed: Option<String>) -> String {
        self.canonical_labels
            .entry(uri.to_string())
            .or_insert_with(|| {
                observed
                    .filter(|l| !l.trim().is_empty())
                    .unwrap_or_else(|| uri.to_string())
            })
            .clone()
    }

    /// Rows dropped because a URI was missing.
    pub fn missing_uri(&self) -> usize {
        self.missing_uri
    }

    /// Rows dropped because their URI pair was already seen.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

/// Label → URI lookup built from rows *before* deduplication.
///
/// Sources then targets of each row are written in order, so the last
/// mention of a label decides its URL.
pub fn label_url_map(rows: &[RawRow]) -> HashMap<String, String> {
    let mut urls = HashMap::new();
    for row in rows {
        if let Some(label) = &row.source_label {
            if !row.source.is_empty() {
                urls.insert(label.clone(), row.source.clone());
            }
        }
        if let Some(label) = &row.target_label {
            if !row.target.is_empty() {
                urls.insert(label.clone(), row.target.clone());
            }
        }
    }
    urls
}
