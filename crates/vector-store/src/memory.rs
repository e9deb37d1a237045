use crate::document::{Document, QueryFilter, SearchHit};
use crate::embedding::{cosine, HashedTermEmbedder};
use crate::error::{Result, VectorStoreError};
use crate::index::{SimilarityIndex, UpsertOutcome};
use async_trait::async_trait;
use ndarray::Array1;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::RwLock;

struct IndexedDocument {
    document: Document,
    vector: Array1<f32>,
}

/// In-process similarity index over hashed term-frequency vectors.
///
/// Also carries fault switches (`set_available`, `fail_upserts`,
/// `set_query_latency`) used to drive degraded retrieval and partial-batch
/// retries.
#[derive(Default)]
pub struct MemoryIndex {
    embedder: HashedTermEmbedder,
    entries: RwLock<HashMap<String, IndexedDocument>>,
    offline: AtomicBool,
    pending_failures: Mutex<HashMap<String, usize>>,
    query_latency: Mutex<Option<Duration>>,
}

impl MemoryIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_embedder(embedder: HashedTermEmbedder) -> Self {
        Self {
            embedder,
            ..Self::default()
        }
    }

    pub fn set_available(&self, available: bool) {
        self.offline.store(!available, Ordering::Release);
    }

    /// Make the next `times` upserts of each id fail.
    pub fn fail_upserts<I, S>(&self, ids: I, times: usize)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pending = self
            .pending_failures
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for id in ids {
            pending.insert(id.into(), times);
        }
    }

    /// Delay every query by `latency`.
    pub fn set_query_latency(&self, latency: Option<Duration>) {
        *self
            .query_latency
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = latency;
    }

    pub async fn get(&self, id: &str) -> Option<Document> {
        self.entries
            .read()
            .await
            .get(id)
            .map(|entry| entry.document.clone())
    }

    pub async fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn ensure_available(&self) -> Result<()> {
        if self.offline.load(Ordering::Acquire) {
            return Err(VectorStoreError::Unavailable(
                "memory index is offline".into(),
            ));
        }
        Ok(())
    }

    fn take_failure(&self, id: &str) -> bool {
        let mut pending = self
            .pending_failures
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match pending.get_mut(id) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl SimilarityIndex for MemoryIndex {
    async fn upsert(&self, documents: Vec<Document>) -> Result<UpsertOutcome> {
        self.ensure_available()?;

        let mut outcome = UpsertOutcome::default();
        let mut prepared = Vec::with_capacity(documents.len());
        for document in documents {
            if document.id.is_empty() {
                return Err(VectorStoreError::InvalidDocument {
                    id: document.id,
                    reason: "empty id".into(),
                });
            }
            if self.take_failure(&document.id) {
                outcome.failed.push(document.id);
                continue;
            }
            let vector = self.embedder.embed(&document.text);
            prepared.push(IndexedDocument { document, vector });
        }

        let mut entries = self.entries.write().await;
        for entry in prepared {
            entries.insert(entry.document.id.clone(), entry);
            outcome.upserted += 1;
        }
        log::debug!(
            "Upserted {} documents ({} failed)",
            outcome.upserted,
            outcome.failed.len()
        );
        Ok(outcome)
    }

    async fn query(&self, text: &str, k: usize, filter: &QueryFilter) -> Result<Vec<SearchHit>> {
        self.ensure_available()?;
        let latency = *self
            .query_latency
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(text);
        let entries = self.entries.read().await;
        let mut hits: Vec<SearchHit> = entries
            .values()
            .filter(|entry| filter.matches(&entry.document.meta))
            .filter_map(|entry| {
                let score = cosine(&query, &entry.vector);
                (score > 0.0).then(|| SearchHit {
                    document: entry.document.clone(),
                    score,
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        hits.truncate(k);

        log::debug!("Similarity query '{text}' -> {} hits", hits.len());
        Ok(hits)
    }

    async fn document_count(&self) -> Result<usize> {
        self.ensure_available()?;
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use upgrade_extractor::{extract, VersionId};

    fn v(s: &str) -> VersionId {
        VersionId::parse(s).unwrap()
    }

    fn atomic_docs(version: &str, text: &str) -> Vec<Document> {
        extract(&v(version), text)
            .iter()
            .map(|change| Document::atomic("kubernetes", change, change.description.clone()))
            .collect()
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let index = MemoryIndex::new();
        let docs = atomic_docs("1.24.0", "- Fixed CVE-2022-3294 in kubelet\n- Added shiny thing");
        index.upsert(docs.clone()).await.unwrap();
        index.upsert(docs).await.unwrap();
        assert_eq!(index.document_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn query_ranks_and_filters_by_range() {
        let index = MemoryIndex::new();
        index
            .upsert(atomic_docs("1.23.0", "- Security fix for CVE-2022-1111 in apiserver"))
            .await
            .unwrap();
        index
            .upsert(atomic_docs(
                "1.24.0",
                "- Security fix for CVE-2022-3294 in kubelet\n- Added shiny dashboard",
            ))
            .await
            .unwrap();

        let filter = QueryFilter::range("kubernetes", v("1.24.0"), v("1.24.0"));
        let hits = index.query("kubelet security fix", 10, &filter).await.unwrap();
        assert!(hits.iter().all(|hit| hit.document.meta.version == v("1.24.0")));
        assert!(hits[0].document.text.contains("CVE-2022-3294"));

        let all = index
            .query("security fix", 1, &QueryFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn scheduled_failures_are_reported_per_id() {
        let index = MemoryIndex::new();
        let docs = atomic_docs("1.24.0", "- Added one feature\n- Added another feature");
        index.fail_upserts([docs[1].id.clone()], 1);

        let first = index.upsert(docs.clone()).await.unwrap();
        assert_eq!(first.upserted, 1);
        assert_eq!(first.failed, vec![docs[1].id.clone()]);

        let retry = index.upsert(vec![docs[1].clone()]).await.unwrap();
        assert_eq!(retry.upserted, 1);
        assert!(retry.failed.is_empty());
        assert_eq!(index.ids().await.len(), 2);
    }

    #[tokio::test]
    async fn offline_index_is_unavailable() {
        let index = MemoryIndex::new();
        index.set_available(false);
        let err = index.query("anything", 5, &QueryFilter::default()).await;
        assert!(matches!(err, Err(VectorStoreError::Unavailable(_))));
        assert!(index.upsert(Vec::new()).await.is_err());

        index.set_available(true);
        assert!(index.upsert(Vec::new()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn query_latency_is_applied() {
        let index = MemoryIndex::new();
        index.set_query_latency(Some(Duration::from_secs(30)));
        let slow = tokio::time::timeout(
            Duration::from_secs(1),
            index.query("x", 1, &QueryFilter::default()),
        )
        .await;
        assert!(slow.is_err());
    }
}
