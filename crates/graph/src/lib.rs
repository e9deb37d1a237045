//! # Upgrade Graph
//!
//! Release-order graph of a tool's versions with per-version risk flags.
//!
//! ## Architecture
//!
//! ```text
//! (version identifier, section text)[]
//!     │
//!     ├──> Graph Builder
//!     │      ├─ Parse identifiers (bad ones skipped + reported)
//!     │      ├─ Extract changes (rayon, one task per version)
//!     │      ├─ Sort by version order
//!     │      └─ PRECEDES edge between each adjacent pair
//!     │
//!     ├──> Version Graph (petgraph)
//!     │      ├─ Nodes: versions with attached changes and flags
//!     │      └─ Edges: PRECEDES (a single simple path)
//!     │
//!     └──> Graph Store (snapshot reads)
//!            ├─ path(tool, from, to)
//!            ├─ changes_in_range(tool, from, to, filter)
//!            └─ summary(tool, from, to)
//! ```

mod builder;
mod error;
mod filter;
mod graph;
mod store;
mod types;

pub use builder::{BuildOutput, BuildReport, GraphBuilder, RejectedVersion};
pub use error::{GraphError, Result};
pub use filter::TypeFilter;
pub use store::{GraphStore, MemoryGraphStore};
pub use types::{
    RangeChanges, RangePath, RangeReport, RangeSummary, RangeWarning, Relation, TypeTotals,
    VersionFlagRow, VersionFlags, VersionGraph, VersionNode,
};
