use crate::error::{GraphError, Result};
use crate::filter::TypeFilter;
use crate::types::{RangeChanges, RangePath, RangeReport, RangeSummary, VersionGraph};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use upgrade_extractor::VersionId;

/// Read side of the version graph, as consumed by retrieval.
///
/// Implementations may be durable; every call observes one consistent
/// snapshot of a tool's graph.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn path(&self, tool: &str, from: &VersionId, to: &VersionId) -> Result<RangePath>;

    async fn changes_in_range(
        &self,
        tool: &str,
        from: &VersionId,
        to: &VersionId,
        filter: Option<&TypeFilter>,
    ) -> Result<RangeChanges>;

    async fn summary(&self, tool: &str, from: &VersionId, to: &VersionId)
        -> Result<RangeSummary>;

    /// Changes and summary of a range from one snapshot; a rebuild published
    /// in between must not split them.
    async fn range_report(
        &self,
        tool: &str,
        from: &VersionId,
        to: &VersionId,
        filter: Option<&TypeFilter>,
    ) -> Result<RangeReport>;
}

/// In-memory graph store with snapshot reads.
///
/// A rebuild swaps the whole `Arc<VersionGraph>` under a short write lock, so
/// concurrent readers see either the old or the new graph, never a mix.
#[derive(Default)]
pub struct MemoryGraphStore {
    graphs: RwLock<HashMap<String, Arc<VersionGraph>>>,
    offline: AtomicBool,
}

impl MemoryGraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the graph of `graph.tool()`; returns the previous snapshot.
    pub fn replace(&self, graph: VersionGraph) -> Option<Arc<VersionGraph>> {
        let tool = graph.tool().to_string();
        let next = Arc::new(graph);
        let mut guard = self
            .graphs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        log::info!(
            "Publishing version graph for {tool} ({} versions)",
            next.version_count()
        );
        guard.insert(tool, next)
    }

    /// Current snapshot of a tool's graph.
    pub fn snapshot(&self, tool: &str) -> Result<Arc<VersionGraph>> {
        if self.offline.load(Ordering::Acquire) {
            return Err(GraphError::Unavailable("graph store is offline".into()));
        }
        let guard = self
            .graphs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard
            .get(tool)
            .cloned()
            .ok_or_else(|| GraphError::UnknownTool(tool.to_string()))
    }

    #[must_use]
    pub fn tools(&self) -> Vec<String> {
        let guard = self
            .graphs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut tools: Vec<String> = guard.keys().cloned().collect();
        tools.sort();
        tools
    }

    /// Simulate an outage of the backing store.
    pub fn set_available(&self, available: bool) {
        self.offline.store(!available, Ordering::Release);
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn path(&self, tool: &str, from: &VersionId, to: &VersionId) -> Result<RangePath> {
        Ok(self.snapshot(tool)?.path(from, to))
    }

    async fn changes_in_range(
        &self,
        tool: &str,
        from: &VersionId,
        to: &VersionId,
        filter: Option<&TypeFilter>,
    ) -> Result<RangeChanges> {
        Ok(self.snapshot(tool)?.changes_in_range(from, to, filter))
    }

    async fn summary(
        &self,
        tool: &str,
        from: &VersionId,
        to: &VersionId,
    ) -> Result<RangeSummary> {
        Ok(self.snapshot(tool)?.summary(from, to))
    }

    async fn range_report(
        &self,
        tool: &str,
        from: &VersionId,
        to: &VersionId,
        filter: Option<&TypeFilter>,
    ) -> Result<RangeReport> {
        Ok(self.snapshot(tool)?.range_report(from, to, filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use upgrade_extractor::VersionSection;

    fn build(tool: &str, ids: &[&str]) -> VersionGraph {
        GraphBuilder::new(tool)
            .build(ids.iter().map(|id| VersionSection {
                version: (*id).to_string(),
                text: "- Added something".to_string(),
            }))
            .graph
    }

    fn v(s: &str) -> VersionId {
        VersionId::parse(s).unwrap()
    }

    #[tokio::test]
    async fn snapshot_survives_replacement() {
        let store = MemoryGraphStore::new();
        store.replace(build("helm", &["3.0.0", "3.1.0"]));

        let before = store.snapshot("helm").unwrap();
        store.replace(build("helm", &["3.0.0", "3.1.0", "3.2.0"]));

        assert_eq!(before.version_count(), 2);
        let path = store.path("helm", &v("3.0.0"), &v("3.2.0")).await.unwrap();
        assert_eq!(path.versions.len(), 3);
        assert_eq!(store.tools(), vec!["helm".to_string()]);
    }

    #[tokio::test]
    async fn unknown_tool_and_outage_are_errors() {
        let store = MemoryGraphStore::new();
        store.replace(build("helm", &["3.0.0"]));

        let err = store.path("terraform", &v("1.0.0"), &v("1.1.0")).await;
        assert!(matches!(err, Err(GraphError::UnknownTool(_))));

        store.set_available(false);
        let err = store
            .changes_in_range("helm", &v("3.0.0"), &v("3.0.0"), None)
            .await;
        assert!(matches!(err, Err(GraphError::Unavailable(_))));

        store.set_available(true);
        assert!(store.summary("helm", &v("3.0.0"), &v("3.0.0")).await.is_ok());
    }

    #[tokio::test]
    async fn range_report_pairs_changes_with_their_summary() {
        let store = MemoryGraphStore::new();
        store.replace(build("helm", &["3.0.0", "3.1.0"]));

        let report = store
            .range_report("helm", &v("3.0.0"), &v("3.1.0"), None)
            .await
            .unwrap();
        assert_eq!(report.changes.changes.len(), 2);
        assert_eq!(report.summary.totals.total(), report.changes.changes.len());
        assert_eq!(
            report.changes,
            store
                .changes_in_range("helm", &v("3.0.0"), &v("3.1.0"), None)
                .await
                .unwrap()
        );

        store.set_available(false);
        assert!(store
            .range_report("helm", &v("3.0.0"), &v("3.1.0"), None)
            .await
            .is_err());
    }
}
