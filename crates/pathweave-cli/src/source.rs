//! Where pathway documents come from.
//!
//! Each pathway needs two documents: the query-service results (SPARQL JSON)
//! and the diagram (GPML). Both are fetched concurrently and either failure
//! aborts the pathway.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// Raw documents for one pathway, not yet parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathwayDocuments {
    pub query_results: String,
    pub diagram: String,
}

#[async_trait]
pub trait PathwaySource: Send + Sync {
    async fn query_results(&self, pathway_id: &str) -> Result<String>;

    async fn diagram(&self, pathway_id: &str) -> Result<String>;
}

/// Fetch both documents; the first error wins and nothing partial is returned.
pub async fn fetch_documents(
    source: &dyn PathwaySource,
    pathway_id: &str,
) -> Result<PathwayDocuments> {
    let (query_results, diagram) =
        tokio::try_join!(source.query_results(pathway_id), source.diagram(pathway_id))
            .with_context(|| format!("failed to fetch pathway {pathway_id}"))?;
    Ok(PathwayDocuments {
        query_results,
        diagram,
    })
}

// ============================================================================
// FileSource
// ============================================================================

/// Reads `<dir>/<id>.sparql.json` and `<dir>/<id>.gpml`.
#[derive(Debug, Clone)]
pub struct FileSource {
    data_dir: PathBuf,
}

impl FileSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn query_results_path(&self, pathway_id: &str) -> PathBuf {
        self.data_dir.join(format!("{pathway_id}.sparql.json"))
    }

    pub fn diagram_path(&self, pathway_id: &str) -> PathBuf {
        self.data_dir.join(format!("{pathway_id}.gpml"))
    }
}

async fn read(path: PathBuf) -> Result<String> {
    tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

#[async_trait]
impl PathwaySource for FileSource {
    async fn query_results(&self, pathway_id: &str) -> Result<String> {
        read(self.query_results_path(pathway_id)).await
    }

    async fn diagram(&self, pathway_id: &str) -> Result<String> {
        read(self.diagram_path(pathway_id)).await
    }
}
