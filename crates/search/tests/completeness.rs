//! Structural presence always overrides ranking truncation

use proptest::prelude::*;
use std::sync::Arc;
use upgrade_extractor::{VersionId, VersionSection};
use upgrade_graph::{GraphBuilder, GraphStore, MemoryGraphStore};
use upgrade_indexer::{DualIndexer, IndexerConfig};
use upgrade_search::{HybridRetriever, QueryClassifier, RetrieveOptions};
use upgrade_vector_store::{Document, MemoryIndex};

const LINES: &[&str] = &[
    "- Breaking change: the v1beta1 admission API was removed",
    "- Fixed CVE-2023-2431 seccomp bypass",
    "- Security fix for token leakage in logs",
    "- Dropped support flag --legacy-mode",
    "- Deleted the unused cache directory",
    "- The batch/v1beta1 API is deprecated",
    "- Legacy storage driver will be removed in a future release",
    "- Added dual-stack networking",
    "- Now supports structured logging",
    "- Improved scheduler throughput",
];

const QUESTIONS: &[&str] = &[
    "what security patches exist",
    "breaking changes and deprecations",
    "which removals affect me",
    "give me an overview",
    "how fast is the scheduler",
];

fn sections() -> impl Strategy<Value = Vec<(u64, Vec<usize>)>> {
    prop::collection::btree_map(0u64..12, prop::collection::vec(0..LINES.len(), 0..6), 1..6)
        .prop_map(|map| map.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn bundle_contains_every_structural_change(
        versions in sections(),
        question in prop::sample::select(QUESTIONS),
        k in 0usize..3,
        index_docs in any::<bool>(),
        bounds in (0u64..12, 0u64..12),
    ) {
        let graph = GraphBuilder::new("tool")
            .build(versions.iter().map(|(minor, picks)| VersionSection {
                version: format!("2.{minor}.0"),
                text: picks.iter().map(|&i| LINES[i]).collect::<Vec<_>>().join("\n"),
            }))
            .graph;
        let (from, to) = (
            VersionId::new(2, bounds.0.min(bounds.1), 0),
            VersionId::new(2, bounds.0.max(bounds.1), 0),
        );

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        runtime.block_on(async {
            let index = Arc::new(MemoryIndex::new());
            if index_docs {
                DualIndexer::new(IndexerConfig::default())
                    .unwrap()
                    .index(&graph, index.as_ref())
                    .await
                    .unwrap();
            }
            let store = Arc::new(MemoryGraphStore::new());
            store.replace(graph);

            let filter = QueryClassifier::classify(question).filter().cloned();
            let expected = store
                .changes_in_range("tool", &from, &to, filter.as_ref())
                .await
                .unwrap();

            let retriever = HybridRetriever::new(store.clone(), index.clone());
            let bundle = retriever
                .retrieve("tool", &from, &to, question, &RetrieveOptions::default().with_k(k))
                .await
                .unwrap();

            for change in &expected.changes {
                let id = Document::atomic_id("tool", change);
                assert!(bundle.contains(&id), "missing {id} for '{question}'");
            }
            assert_eq!(bundle.structural_items().count(), expected.changes.len());
            assert!(bundle.len() <= expected.changes.len() + k);
        });
    }
}
