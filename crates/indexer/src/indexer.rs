use crate::chunking::{chunk_text, normalize_text};
use crate::config::IndexerConfig;
use crate::error::Result;
use crate::stats::IndexStats;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use upgrade_graph::{VersionGraph, VersionNode};
use upgrade_vector_store::{Document, DocumentTemplates, SimilarityIndex};

/// Both document projections of a version graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSet {
    /// Full-content chunks in version order.
    pub full_content: Vec<Document>,
    /// One document per change, in version then priority order.
    pub atomic: Vec<Document>,
}

impl DocumentSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.full_content.len() + self.atomic.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.full_content.iter().chain(self.atomic.iter())
    }

    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.iter().map(|doc| doc.id.clone()).collect()
    }
}

/// Projects a version graph into full-content and atomic-change documents and
/// submits them to a similarity index.
pub struct DualIndexer {
    config: IndexerConfig,
    templates: DocumentTemplates,
}

impl DualIndexer {
    pub fn new(config: IndexerConfig) -> Result<Self> {
        Self::with_templates(config, DocumentTemplates::default())
    }

    pub fn with_templates(config: IndexerConfig, templates: DocumentTemplates) -> Result<Self> {
        config.validate()?;
        templates.validate()?;
        Ok(Self { config, templates })
    }

    #[must_use]
    pub const fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Shape documents for every version and change of `graph`.
    ///
    /// Document generation is independent per version and runs on the rayon
    /// pool; output order follows version order regardless.
    pub fn documents(&self, graph: &VersionGraph) -> Result<DocumentSet> {
        let nodes: Vec<&VersionNode> = graph.versions().collect();
        let per_version: Vec<(Vec<Document>, Vec<Document>)> = nodes
            .par_iter()
            .map(|node| self.version_documents(graph.tool(), node))
            .collect::<Result<_>>()?;

        let mut set = DocumentSet::default();
        for (full, atomic) in per_version {
            set.full_content.extend(full);
            set.atomic.extend(atomic);
        }
        Ok(set)
    }

    fn version_documents(
        &self,
        tool: &str,
        node: &VersionNode,
    ) -> Result<(Vec<Document>, Vec<Document>)> {
        let normalized = normalize_text(&node.text);
        let full = chunk_text(
            &normalized,
            self.config.max_unit_chars,
            self.config.overlap_chars(),
        )
        .into_iter()
        .enumerate()
        .map(|(seq, chunk)| {
            let text = self.templates.render_full(tool, &node.version, seq, &chunk)?;
            Ok(Document::full_content(tool, &node.version, seq, text))
        })
        .collect::<Result<Vec<_>>>()?;

        let mut changes: Vec<_> = node.changes().iter().collect();
        changes.sort_by_key(|change| change.change_type.priority());
        let atomic = changes
            .into_iter()
            .map(|change| {
                let text = self.templates.render_atomic(tool, change)?;
                Ok(Document::atomic(tool, change, text))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((full, atomic))
    }

    /// Generate documents for `graph` and upsert them in batches.
    ///
    /// Re-running on an unchanged graph submits the same ids, so the index
    /// does not grow. A partially failed batch retries only its failed ids, up
    /// to `max_retries` times; ids still failing are reported in the stats.
    pub async fn index(
        &self,
        graph: &VersionGraph,
        index: &dyn SimilarityIndex,
    ) -> Result<IndexStats> {
        let start = Instant::now();
        let documents = self.documents(graph)?;
        let mut stats = IndexStats {
            versions: graph.version_count(),
            full_documents: documents.full_content.len(),
            atomic_documents: documents.atomic.len(),
            ..IndexStats::default()
        };

        log::info!(
            "Indexing {} documents for {} ({} versions)",
            documents.len(),
            graph.tool(),
            stats.versions
        );

        let all: Vec<Document> = documents
            .full_content
            .into_iter()
            .chain(documents.atomic)
            .collect();
        for batch in all.chunks(self.config.batch_size) {
            self.submit_batch(batch, index, &mut stats).await?;
        }

        #[allow(clippy::cast_possible_truncation)]
        {
            stats.time_ms = start.elapsed().as_millis() as u64;
        }
        if stats.failed.is_empty() {
            log::info!("Indexing completed: {stats:?}");
        } else {
            log::warn!(
                "Indexing completed with {} failed documents: {:?}",
                stats.failed.len(),
                stats.failed
            );
        }
        Ok(stats)
    }

    async fn submit_batch(
        &self,
        batch: &[Document],
        index: &dyn SimilarityIndex,
        stats: &mut IndexStats,
    ) -> Result<()> {
        stats.batches += 1;
        let by_id: HashMap<&str, &Document> =
            batch.iter().map(|doc| (doc.id.as_str(), doc)).collect();

        let outcome = index.upsert(batch.to_vec()).await?;
        stats.upserted += outcome.upserted;
        let mut pending: Vec<String> = outcome.failed;

        let mut attempt = 0;
        while !pending.is_empty() && attempt < self.config.max_retries {
            attempt += 1;
            log::warn!(
                "Retrying {} failed documents (attempt {attempt}/{})",
                pending.len(),
                self.config.max_retries
            );
            let unique: HashSet<&str> = pending.iter().map(String::as_str).collect();
            let retry: Vec<Document> = unique
                .into_iter()
                .filter_map(|id| by_id.get(id).map(|doc| (*doc).clone()))
                .collect();
            stats.retried += retry.len();
            let outcome = index.upsert(retry).await?;
            stats.upserted += outcome.upserted;
            pending = outcome.failed;
        }

        stats.failed.extend(pending);
        Ok(())
    }
}
