use serde::{Deserialize, Serialize};

/// Outcome of one `DualIndexer::index` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub versions: usize,
    pub full_documents: usize,
    pub atomic_documents: usize,
    pub batches: usize,
    pub upserted: usize,
    /// Documents re-submitted after a partial batch failure.
    pub retried: usize,
    /// Ids still failing once retries were exhausted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
    pub time_ms: u64,
}

impl IndexStats {
    #[must_use]
    pub fn documents(&self) -> usize {
        self.full_documents + self.atomic_documents
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
