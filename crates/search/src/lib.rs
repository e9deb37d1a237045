//! # Upgrade Search
//!
//! Hybrid retrieval of upgrade context over a version range.
//!
//! ## Architecture
//!
//! ```text
//! question + (tool, from, to)
//!     │
//!     ├──> QueryClassifier ──> type filter (or unfiltered)
//!     │
//!     ├──┬─> Semantic pass    SimilarityIndex::query(question, k, range)
//!     │  └─> Structural pass  GraphStore::changes_in_range(filter) + summary
//!     │        (concurrent, each under a timeout; caller deadline over both)
//!     │
//!     ├──> merge
//!     │      ├─ every structural change, version then priority order
//!     │      └─ semantic-only hits by descending score
//!     │
//!     └──> ContextBundle { items, summary, degraded }
//!            └─> render_context / AnswerComposer
//! ```

mod bundle;
mod context;
mod error;
mod hybrid;
mod merge;
mod presets;
mod query_classifier;

pub use bundle::{BundleItem, ContextBundle, PassStatus, Provenance};
pub use context::{render_context, AnswerComposer, ContextEcho, COMPLETENESS_DIRECTIVE};
pub use error::{Result, SearchError};
pub use hybrid::{HybridRetriever, RetrieveOptions, DEFAULT_K, DEFAULT_PASS_TIMEOUT};
pub use merge::merge;
pub use presets::Preset;
pub use query_classifier::{QueryClassifier, QueryType, Unfiltered};
