use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use upgrade_extractor::{Change, ChangeType, VersionId};

/// Derived per-version risk flags, recomputed whenever a change is attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionFlags {
    pub has_breaking: bool,
    pub has_deprecation: bool,
    pub has_removal: bool,
    pub has_security: bool,
    pub change_count: usize,
}

impl VersionFlags {
    #[must_use]
    pub fn from_changes(changes: &[Change]) -> Self {
        changes.iter().fold(Self::default(), |mut flags, change| {
            match change.change_type {
                ChangeType::Breaking => flags.has_breaking = true,
                ChangeType::Deprecation => flags.has_deprecation = true,
                ChangeType::Removal => flags.has_removal = true,
                ChangeType::Security => flags.has_security = true,
                ChangeType::Feature | ChangeType::Other => {}
            }
            flags.change_count += 1;
            flags
        })
    }

    #[must_use]
    pub const fn is_critical(&self) -> bool {
        self.has_breaking || self.has_removal || self.has_security
    }
}

/// One release of a tool with the changes extracted from its notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionNode {
    pub tool: String,
    pub version: VersionId,
    /// Source section text, kept for full-content documents.
    pub text: String,
    changes: Vec<Change>,
    flags: VersionFlags,
}

impl VersionNode {
    #[must_use]
    pub fn new(tool: impl Into<String>, version: VersionId, text: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            version,
            text: text.into(),
            changes: Vec::new(),
            flags: VersionFlags::default(),
        }
    }

    /// Attach a change and refresh flags. Returns `false` when a change with the
    /// same line hash is already attached.
    pub fn attach(&mut self, change: Change) -> bool {
        if change.version != self.version
            || self
                .changes
                .iter()
                .any(|c| c.raw_line_hash == change.raw_line_hash)
        {
            return false;
        }
        self.changes.push(change);
        self.flags = VersionFlags::from_changes(&self.changes);
        true
    }

    #[must_use]
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    #[must_use]
    pub const fn flags(&self) -> VersionFlags {
        self.flags
    }
}

/// Edge relation between versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Source immediately precedes target in release order.
    Precedes,
}

/// Version-sequence graph for a single tool.
#[derive(Debug, Clone)]
pub struct VersionGraph {
    pub(crate) tool: String,
    pub(crate) graph: DiGraph<VersionNode, Relation>,
    /// Node indices sorted by version order.
    pub(crate) order: Vec<NodeIndex>,
    pub(crate) by_version: HashMap<VersionId, NodeIndex>,
}

impl VersionGraph {
    #[must_use]
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            graph: DiGraph::new(),
            order: Vec::new(),
            by_version: HashMap::new(),
        }
    }

    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    #[must_use]
    pub fn version_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn change_count(&self) -> usize {
        self.graph
            .node_weights()
            .map(|node| node.changes.len())
            .sum()
    }

    #[must_use]
    pub fn node(&self, version: &VersionId) -> Option<&VersionNode> {
        self.by_version
            .get(version)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// All versions in ascending order.
    pub fn versions(&self) -> impl Iterator<Item = &VersionNode> {
        self.order.iter().filter_map(|&idx| self.graph.node_weight(idx))
    }
}

/// Non-fatal observations made while answering a range query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeWarning {
    /// Requested lower bound is not a known version.
    FromNotFound {
        requested: VersionId,
        used: Option<VersionId>,
    },
    /// Requested upper bound is not a known version.
    ToNotFound {
        requested: VersionId,
        used: Option<VersionId>,
    },
    /// `from` was greater than `to`; bounds were swapped.
    Inverted { from: VersionId, to: VersionId },
    /// No known version falls inside the range.
    EmptyRange { from: VersionId, to: VersionId },
}

impl std::fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FromNotFound { requested, used } | Self::ToNotFound { requested, used } => {
                let side = if matches!(self, Self::FromNotFound { .. }) {
                    "start"
                } else {
                    "end"
                };
                match used {
                    Some(used) => write!(
                        f,
                        "range {side} {requested} not found; using nearest version {used}"
                    ),
                    None => write!(f, "range {side} {requested} not found"),
                }
            }
            Self::Inverted { from, to } => {
                write!(f, "range {from}..{to} was inverted; bounds swapped")
            }
            Self::EmptyRange { from, to } => write!(f, "no versions between {from} and {to}"),
        }
    }
}

/// Ordered versions of a range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangePath {
    pub versions: Vec<VersionId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RangeWarning>,
}

/// Changes attached to the versions of a range, in version then priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeChanges {
    pub changes: Vec<Change>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RangeWarning>,
}

/// Per-version flag row of a range summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionFlagRow {
    pub version: VersionId,
    #[serde(flatten)]
    pub flags: VersionFlags,
}

/// Change counts per type over a range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTotals {
    pub breaking: usize,
    pub security: usize,
    pub removal: usize,
    pub deprecation: usize,
    pub feature: usize,
    pub other: usize,
}

impl TypeTotals {
    pub fn add(&mut self, change_type: ChangeType) {
        match change_type {
            ChangeType::Breaking => self.breaking += 1,
            ChangeType::Security => self.security += 1,
            ChangeType::Removal => self.removal += 1,
            ChangeType::Deprecation => self.deprecation += 1,
            ChangeType::Feature => self.feature += 1,
            ChangeType::Other => self.other += 1,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.breaking + self.security + self.removal + self.deprecation + self.feature + self.other
    }
}

/// Aggregate flags for every version of a range plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSummary {
    pub tool: String,
    pub from: VersionId,
    pub to: VersionId,
    pub versions: Vec<VersionFlagRow>,
    pub totals: TypeTotals,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RangeWarning>,
}

/// Changes and summary of one range, read from a single graph snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeReport {
    pub changes: RangeChanges,
    pub summary: RangeSummary,
}
