use crate::config::ScoutConfig;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use upgrade_extractor::VersionId;
use upgrade_graph::{BuildReport, GraphBuilder, MemoryGraphStore, VersionGraph};
use upgrade_indexer::{ingest, DirectorySource, DualIndexer, IndexStats, IngestReport, LineFailure};
use upgrade_vector_store::MemoryIndex;

/// What ingestion, graph construction and indexing produced.
#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fetch_failures: Vec<LineFailure>,
    pub build: BuildReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexStats>,
}

/// A tool's graph, loaded into the in-memory stores.
pub struct Pipeline {
    pub store: Arc<MemoryGraphStore>,
    pub index: Arc<MemoryIndex>,
    pub report: PipelineReport,
}

impl Pipeline {
    /// Fetch and parse the changelogs of `[from, to]` into a graph.
    ///
    /// With `with_index`, every version and change is also submitted to the
    /// similarity index.
    pub async fn load(
        config: &ScoutConfig,
        source_root: &Path,
        tool: &str,
        from: &VersionId,
        to: &VersionId,
        with_index: bool,
    ) -> Result<Self> {
        let source = DirectorySource::new(source_root);
        let IngestReport {
            lines,
            sections,
            failures,
            duplicates,
        } = ingest(
            &source,
            tool,
            from,
            to,
            config.sections.min_section_chars,
        )
        .await
        .with_context(|| format!("Failed to fetch changelogs from {}", source_root.display()))?;
        if !duplicates.is_empty() {
            log::info!("Kept first section for repeated versions: {}", duplicates.join(", "));
        }
        if sections.is_empty() {
            bail!(
                "No version sections found for {tool} in lines {}",
                lines.join(", ")
            );
        }

        let output = GraphBuilder::new(tool).build(sections);
        let graph = output.graph;
        log::info!(
            "Built {tool} graph: {} versions, {} changes",
            graph.version_count(),
            graph.change_count()
        );

        let index = Arc::new(MemoryIndex::new());
        let stats = if with_index {
            Some(index_graph(config, &graph, &index).await?)
        } else {
            None
        };

        let store = Arc::new(MemoryGraphStore::new());
        store.replace(graph);

        Ok(Self {
            store,
            index,
            report: PipelineReport {
                lines,
                fetch_failures: failures,
                build: output.report,
                index: stats,
            },
        })
    }

    pub fn graph(&self, tool: &str) -> Result<Arc<VersionGraph>> {
        Ok(self.store.snapshot(tool)?)
    }
}

async fn index_graph(
    config: &ScoutConfig,
    graph: &VersionGraph,
    index: &MemoryIndex,
) -> Result<IndexStats> {
    let indexer = DualIndexer::with_templates(config.indexer.clone(), config.templates.clone())?;
    let stats = indexer.index(graph, index).await?;
    if !stats.is_complete() {
        log::warn!("{} documents failed to index", stats.failed.len());
    }
    Ok(stats)
}
