use crate::document::{Document, QueryFilter, SearchHit};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of one upsert batch.
///
/// A batch can partially fail; `failed` names the documents that were not
/// stored so callers can retry just that subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub upserted: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
}

/// Similarity-index collaborator.
///
/// Vectors stay internal to the implementation; callers see documents and
/// scores only. `upsert` replaces documents by id.
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    async fn upsert(&self, documents: Vec<Document>) -> Result<UpsertOutcome>;

    /// Up to `k` documents matching `filter`, best score first.
    async fn query(&self, text: &str, k: usize, filter: &QueryFilter) -> Result<Vec<SearchHit>>;

    async fn document_count(&self) -> Result<usize>;
}
