//! Label canonicalization, fuzzy key resolution and display-label arbitration.
//!
//! All three are total functions: they never fail, an unusable label simply
//! normalizes to an empty core.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default minimum overlap for the fuzzy prefix rule.
///
/// Variants of this heuristic have used 3 and 5; 3 merges more aggressively
/// (`AKT` + `AKT1`), 5 only merges longer symbols. Override via
/// [`MatchConfig::min_overlap`].
pub const DEFAULT_MIN_OVERLAP: usize = 3;

// ============================================================================
// Configuration
// ============================================================================

/// Static alias table applied to a core after truncation.
///
/// Both sides are stored normalized, so `{"pi3k": "PIK3-CA"}` in a config
/// file behaves like `{"PI3K": "PIK3CA"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct AliasTable(BTreeMap<String, String>);

impl AliasTable {
    pub fn insert(&mut self, from: &str, to: &str) {
        self.0.insert(clean(from, false), clean(to, false));
    }

    pub fn get(&self, core: &str) -> Option<&str> {
        self.0.get(core).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for AliasTable {
    fn from(raw: BTreeMap<String, String>) -> Self {
        let mut table = AliasTable::default();
        for (from, to) in &raw {
            table.insert(from, to);
        }
        table
    }
}

impl From<AliasTable> for BTreeMap<String, String> {
    fn from(table: AliasTable) -> Self {
        table.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Shortest length both strings must reach before a prefix match counts.
    pub min_overlap: usize,
    /// Keep `/` while stripping so the core can be cut at the first segment.
    pub split_on_slash: bool,
    pub aliases: AliasTable,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_overlap: DEFAULT_MIN_OVERLAP,
            split_on_slash: true,
            aliases: AliasTable::default(),
        }
    }
}

// ============================================================================
// LabelCanonicalizer
// ============================================================================

/// Trim, uppercase and drop everything outside `[A-Z0-9]` (and `/` if asked).
pub fn clean(label: &str, keep_slash: bool) -> String {
    label
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || (keep_slash && *c == '/'))
        .collect()
}

/// Comparable core of a label: cleaned, cut at the first `/`, alias-resolved.
///
/// `"  pip-3 / PTEN"` → `"PIP3"`. Returns an empty string for labels with no
/// usable characters; callers drop such rows.
pub fn normalize(label: &str, config: &MatchConfig) -> String {
    let cleaned = clean(label, config.split_on_slash);
    let core = cleaned.split('/').next().unwrap_or_default();
    match config.aliases.get(core) {
        Some(alias) => alias.to_string(),
        None => core.to_string(),
    }
}

// ============================================================================
// KeyResolver
// ============================================================================

/// Map `core` onto an existing canonical key, or mint `core` as a new key.
///
/// `existing` must be in first-seen order. The first key that shares a prefix
/// relation with `core` (and where both are at least `min_overlap` long) wins;
/// there is no scoring across candidates.
pub fn resolve_key<'a, I>(core: &str, existing: I, min_overlap: usize) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    for key in existing {
        let overlap = key.len().min(core.len());
        if overlap >= min_overlap && (key.starts_with(core) || core.starts_with(key)) {
            return key.to_string();
        }
    }
    core.to_string()
}

// ============================================================================
// LabelArbiter
// ============================================================================

/// Pick the display label for `core_key` between the current and a new mention.
///
/// A bare base form beats a numbered variant (`PIP` over `PIP3`) in either
/// direction; otherwise the longer label wins and ties keep `current`.
pub fn choose_better_label<'a>(current: &'a str, candidate: &'a str, core_key: &str) -> &'a str {
    let current_extra = extra_suffix(current, core_key);
    let candidate_extra = extra_suffix(candidate, core_key);

    if current_extra.is_empty() && is_all_digits(&candidate_extra) {
        return current;
    }
    if candidate_extra.is_empty() && is_all_digits(&current_extra) {
        return candidate;
    }
    if candidate.chars().count() > current.chars().count() {
        candidate
    } else {
        current
    }
}

/// What remains of the cleaned label after the key prefix; empty when the
/// label does not start with the key.
fn extra_suffix(label: &str, core_key: &str) -> String {
    clean(label, false)
        .strip_prefix(core_key)
        .map(str::to_string)
        .unwrap_or_default()
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        let config = MatchConfig::default();
        assert_eq!(normalize("  Akt-1 ", &config), "AKT1");
        assert_eq!(normalize("p53 (human)", &config), "P53HUMAN");
        assert_eq!(normalize("PI(3,4,5)P3", &config), "PI345P3");
    }

    #[test]
    fn normalize_keeps_first_segment() {
        let config = MatchConfig::default();
        assert_eq!(normalize("AKT1 / AKT2", &config), "AKT1");

        let flat = MatchConfig {
            split_on_slash: false,
            ..MatchConfig::default()
        };
        assert_eq!(normalize("AKT1 / AKT2", &flat), "AKT1AKT2");
    }

    #[test]
    fn normalize_empty_and_symbol_only_labels() {
        let config = MatchConfig::default();
        assert_eq!(normalize("", &config), "");
        assert_eq!(normalize("  -- ", &config), "");
        assert_eq!(normalize("/AKT", &config), "");
    }

    #[test]
    fn alias_replaces_whole_core() {
        let mut config = MatchConfig::default();
        config.aliases.insert("pi3k", "PIK3-CA");
        assert_eq!(normalize("PI3K", &config), "PIK3CA");
        assert_eq!(normalize("PI3K / p110", &config), "PIK3CA");
        // Only whole cores are replaced.
        assert_eq!(normalize("PI3KR1", &config), "PI3KR1");
    }

    #[test]
    fn alias_table_deserializes_normalized() {
        let table: AliasTable = serde_json::from_str(r#"{"Tnf-a": "tnf"}"#).unwrap();
        assert_eq!(table.get("TNFA"), Some("TNF"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn resolve_key_prefix_either_way() {
        assert_eq!(resolve_key("PIP3", ["PIP"], 3), "PIP");
        assert_eq!(resolve_key("PIP", ["PIP3"], 3), "PIP3");
        assert_eq!(resolve_key("PTEN", ["PIP"], 3), "PTEN");
    }

    #[test]
    fn resolve_key_respects_min_overlap() {
        assert_eq!(resolve_key("AK", ["AKT"], 3), "AK");
        assert_eq!(resolve_key("AKT1", ["AKT"], 5), "AKT1");
        assert_eq!(resolve_key("MAPK14", ["MAPK1"], 5), "MAPK1");
    }

    #[test]
    fn resolve_key_first_match_wins() {
        let existing = ["MAPK", "MAPK1"];
        assert_eq!(resolve_key("MAPK14", existing, 3), "MAPK");
        let reversed = ["MAPK1", "MAPK"];
        assert_eq!(resolve_key("MAPK14", reversed, 3), "MAPK1");
    }

    #[test]
    fn arbiter_prefers_base_over_numbered() {
        assert_eq!(choose_better_label("PIP", "PIP3", "PIP"), "PIP");
        assert_eq!(choose_better_label("PIP3", "PIP", "PIP"), "PIP");
    }

    #[test]
    fn arbiter_falls_back_to_longer_label() {
        assert_eq!(choose_better_label("AKT", "AKT serine kinase", "AKT"), "AKT serine kinase");
        assert_eq!(choose_better_label("Akt", "AKT", "AKT"), "Akt");
    }

    #[test]
    fn arbiter_label_without_key_prefix_counts_as_base() {
        // "PIP" does not start with key "PIP3": both extras are empty.
        assert_eq!(choose_better_label("PIP3", "PIP", "PIP3"), "PIP3");
    }
}
