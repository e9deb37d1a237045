//! # Upgrade Vector Store
//!
//! Document model and similarity-index collaborator for change retrieval.
//!
//! ## Architecture
//!
//! ```text
//! VersionNode / Change
//!     │
//!     ├──> DocumentTemplates
//!     │      ├─ atomic:  "[{TYPE}] {version}: {description}"
//!     │      └─ full:    "{tool} {version}\n{text}"
//!     │
//!     ├──> Document { id, text, meta }
//!     │      ├─ <tool>/<version>/full/<seq>
//!     │      └─ <tool>/<version>/change/<hash>
//!     │
//!     └──> SimilarityIndex (collaborator)
//!            ├─ upsert(documents) -> UpsertOutcome { failed ids }
//!            └─ query(text, k, filter) -> [SearchHit]
//! ```
//!
//! [`MemoryIndex`] is the in-process implementation backed by hashed
//! term-frequency vectors.

mod document;
mod embedding;
mod error;
mod index;
mod memory;
mod templates;

pub use document::{Document, DocumentKind, DocumentMeta, QueryFilter, SearchHit};
pub use embedding::{cosine, HashedTermEmbedder, DEFAULT_DIMENSIONS};
pub use error::{Result, VectorStoreError};
pub use index::{SimilarityIndex, UpsertOutcome};
pub use memory::MemoryIndex;
pub use templates::{DocumentTemplates, DOCUMENT_TEMPLATES_SCHEMA_VERSION};
