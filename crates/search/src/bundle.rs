use crate::query_classifier::QueryType;
use serde::{Deserialize, Serialize};
use upgrade_extractor::VersionId;
use upgrade_graph::{RangeSummary, RangeWarning};
use upgrade_vector_store::Document;

/// Which retrieval pass produced a bundle item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Structural,
    Semantic,
    Both,
}

impl Provenance {
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(self, Self::Structural | Self::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleItem {
    pub document: Document,
    pub provenance: Provenance,
    /// Similarity score, when the semantic pass returned this document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// How one retrieval pass ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum PassStatus {
    Ok { results: usize },
    Unavailable { reason: String },
    TimedOut { after_ms: u64 },
}

impl PassStatus {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Ok { results } => format!("ok ({results} results)"),
            Self::Unavailable { reason } => format!("unavailable: {reason}"),
            Self::TimedOut { after_ms } => format!("timed out after {after_ms} ms"),
        }
    }
}

/// Merged retrieval result handed to answer generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextBundle {
    pub tool: String,
    pub from: VersionId,
    pub to: VersionId,
    pub question: String,
    pub query_type: QueryType,
    /// Structural members first, then semantic-only members by score.
    pub items: Vec<BundleItem>,
    /// Per-version flags for the range; absent when the graph pass failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<RangeSummary>,
    /// Set when either pass contributed nothing.
    pub degraded: bool,
    pub semantic: PassStatus,
    pub structural: PassStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RangeWarning>,
}

impl ContextBundle {
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn structural_items(&self) -> impl Iterator<Item = &BundleItem> {
        self.items
            .iter()
            .filter(|item| item.provenance.is_structural())
    }

    #[must_use]
    pub fn contains(&self, document_id: &str) -> bool {
        self.items.iter().any(|item| item.document.id == document_id)
    }
}
