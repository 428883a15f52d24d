//! Fetch, parse and build pathways through one shared session.

use crate::config::AppConfig;
use crate::source::{fetch_documents, PathwaySource};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use pathweave_core::{
    build_pathway, validate_pathway_id, BuildStats, FrequencyRow, FrequencyStore, Graph, Session,
};
use pathweave_ingest_gpml::parse_rows;
use pathweave_ingest_sparql::parse_results;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathwayReport {
    pub id: String,
    pub title: Option<String>,
    pub graph: Graph,
    pub layers: IndexMap<String, usize>,
    pub stats: BuildStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub pathways: Vec<PathwayReport>,
    /// First-seen order.
    pub frequency: Vec<FrequencyRow>,
    /// Descending pathway count.
    pub ranking: Vec<FrequencyRow>,
}

/// Build one pathway. The generation is taken before fetching, so a build
/// overtaken by a newer one fails with `CoreError::StaleBuild` and leaves the
/// frequency store untouched. Reserved pathway ids fail before any fetch.
pub async fn build_pathway_report(
    session: &Session,
    source: &dyn PathwaySource,
    config: &AppConfig,
    pathway_id: &str,
) -> Result<PathwayReport> {
    validate_pathway_id(pathway_id)?;
    let generation = session.begin();
    let docs = fetch_documents(source, pathway_id).await?;

    let query = parse_results(&docs.query_results)
        .with_context(|| format!("pathway {pathway_id}: bad query results"))?;
    let diagram = parse_rows(&docs.diagram, pathway_id, &config.diagram)
        .with_context(|| format!("pathway {pathway_id}: bad diagram"))?;

    let title = query
        .pathway_title()
        .map(str::to_string)
        .or(diagram.title);
    let skipped_interactions = diagram.skipped_interactions;
    let mut rows = query.into_rows();
    rows.extend(diagram.rows);

    let mut output = session.commit(generation, |store: &mut FrequencyStore| {
        build_pathway(pathway_id, rows, &config.build, store)
    })?;
    output.stats.skipped_interactions = skipped_interactions;

    Ok(PathwayReport {
        id: output.pathway_id,
        title,
        graph: output.graph,
        layers: output.layers,
        stats: output.stats,
    })
}

/// Build every pathway in order; the first failure aborts the run.
pub async fn build_all(
    session: &Session,
    source: &dyn PathwaySource,
    config: &AppConfig,
    pathway_ids: &[String],
) -> Result<BuildReport> {
    let mut pathways = Vec::with_capacity(pathway_ids.len());
    for pathway_id in pathway_ids {
        pathways.push(build_pathway_report(session, source, config, pathway_id).await?);
    }
    Ok(BuildReport {
        pathways,
        frequency: session.frequency_table(),
        ranking: session.with_store(FrequencyStore::ranked),
    })
}
