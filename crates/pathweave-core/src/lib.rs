//! Pathweave core: canonical graph assembly for pathway interaction data
//!
//! Turns noisy interaction rows from heterogeneous sources into one canonical
//! directed graph:
//!
//! ```text
//!  raw rows ──► RowDeduplicator ──► NodeRegistry ──► EdgeBuilder ──► Graph
//!  (URI level)   (first label,      (fuzzy label     (unique edges,    │
//!                 else the URI)      merge)           table rows)      │
//!                                                                      ├──► FrequencyStore
//!                                                                      └──► assign_layers
//! ```
//!
//! Nothing here performs I/O. Source adapters (`pathweave-ingest-*`) produce
//! [`RawRow`]s; the CLI drives fetching and hands the rows to [`build_pathway`].
//!
//! Key resolution and label arbitration are greedy and depend on the order in
//! which rows arrive. Canonical keys are kept in first-seen order so the same
//! input always yields the same graph.

pub mod build;
pub mod canonical;
pub mod config;
pub mod dedup;
pub mod edges;
pub mod error;
pub mod frequency;
pub mod layering;
pub mod model;
pub mod registry;
pub mod session;

pub use build::{build_pathway, BuildOutput, GraphBuilder};
pub use canonical::{choose_better_label, normalize, resolve_key, AliasTable, MatchConfig};
pub use config::{BuildConfig, CustomEdge};
pub use dedup::{label_url_map, RowDeduplicator};
pub use edges::EdgeBuilder;
pub use error::{CoreError, Result};
pub use frequency::{
    validate_pathway_id, FrequencyRecord, FrequencyRow, FrequencyStore, GENE_COLUMN,
};
pub use layering::assign_layers;
pub use model::{BuildStats, CanonicalNode, DirectedEdge, Graph, RawRow, TableRow};
pub use registry::NodeRegistry;
pub use session::{Generation, Session};
