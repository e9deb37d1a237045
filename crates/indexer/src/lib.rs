//! # Upgrade Indexer
//!
//! Changelog ingestion and dual document indexing.
//!
//! ## Pipeline
//!
//! ```text
//! ChangelogSource (CHANGELOG-<major.minor>.md per line)
//!     │
//!     ├──> ingest (release lines, split sections, dedupe versions)
//!     │      └─> VersionSection[]
//!     │
//!     ├──> GraphBuilder (upgrade-graph)
//!     │      └─> VersionGraph
//!     │
//!     └──> DualIndexer
//!            ├─ full-content chunks (normalized, overlapping)
//!            ├─ atomic-change documents
//!            └─ batched upsert, failed-subset retry
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use upgrade_extractor::{VersionId, DEFAULT_MIN_SECTION_CHARS};
//! use upgrade_graph::GraphBuilder;
//! use upgrade_indexer::{ingest, DirectorySource, DualIndexer, IndexerConfig};
//! use upgrade_vector_store::MemoryIndex;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = DirectorySource::new("changelogs");
//!     let (from, to) = (VersionId::parse("1.20.0")?, VersionId::parse("1.24.0")?);
//!     let report = ingest(&source, "kubernetes", &from, &to, DEFAULT_MIN_SECTION_CHARS).await?;
//!
//!     let graph = GraphBuilder::new("kubernetes").build(report.sections).graph;
//!     let index = MemoryIndex::new();
//!     let stats = DualIndexer::new(IndexerConfig::default())?
//!         .index(&graph, &index)
//!         .await?;
//!
//!     println!("Indexed {} documents", stats.documents());
//!     Ok(())
//! }
//! ```

mod chunking;
mod config;
mod error;
mod indexer;
mod ingest;
mod source;
mod stats;

pub use chunking::{chunk_text, normalize_text};
pub use config::IndexerConfig;
pub use error::{IndexerError, Result};
pub use indexer::{DocumentSet, DualIndexer};
pub use ingest::{ingest, release_lines, IngestReport, LineFailure};
pub use source::{ChangelogSource, DirectorySource};
pub use stats::IndexStats;
