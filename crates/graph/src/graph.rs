use crate::error::{GraphError, Result};
use crate::filter::TypeFilter;
use crate::types::{
    RangeChanges, RangePath, RangeReport, RangeSummary, RangeWarning, Relation, TypeTotals,
    VersionFlagRow, VersionGraph, VersionNode,
};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use upgrade_extractor::{Change, VersionId};

/// Resolved inclusive slice of `order` plus the warnings produced resolving it.
struct ResolvedRange {
    lo: usize,
    hi: usize,
    from: VersionId,
    to: VersionId,
    warnings: Vec<RangeWarning>,
}

impl VersionGraph {
    /// Insert a version node. Callers keep `order` consistent via [`Self::link_in_order`].
    pub(crate) fn add_version(&mut self, node: VersionNode) -> NodeIndex {
        let version = node.version.clone();
        let idx = self.graph.add_node(node);
        self.by_version.insert(version, idx);
        idx
    }

    /// Sort nodes by version and rebuild the PRECEDES chain wholesale.
    pub(crate) fn link_in_order(&mut self) {
        self.graph.clear_edges();
        let mut order: Vec<NodeIndex> = self.graph.node_indices().collect();
        order.sort_by(|&a, &b| self.graph[a].version.cmp(&self.graph[b].version));
        for pair in order.windows(2) {
            self.graph.add_edge(pair[0], pair[1], Relation::Precedes);
        }
        self.order = order;
    }

    /// Attach a change to its version, refreshing that version's flags.
    pub fn attach_change(&mut self, change: Change) -> Result<bool> {
        let idx = *self
            .by_version
            .get(&change.version)
            .ok_or_else(|| GraphError::VersionNotFound(change.version.clone()))?;
        Ok(self.graph[idx].attach(change))
    }

    /// Version immediately after `version`, following the PRECEDES edge.
    #[must_use]
    pub fn successor(&self, version: &VersionId) -> Option<&VersionId> {
        let idx = *self.by_version.get(version)?;
        self.next_index(idx).map(|next| &self.graph[next].version)
    }

    /// Version immediately before `version`.
    #[must_use]
    pub fn predecessor(&self, version: &VersionId) -> Option<&VersionId> {
        let idx = *self.by_version.get(version)?;
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .find(|e| matches!(e.weight(), Relation::Precedes))
            .map(|e| &self.graph[e.source()].version)
    }

    fn next_index(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges(idx)
            .find(|e| matches!(e.weight(), Relation::Precedes))
            .map(|e| e.target())
    }

    /// Ordered versions with `from <= v <= to`.
    ///
    /// Missing bounds snap to the nearest version inside the range and are
    /// reported as warnings rather than errors.
    #[must_use]
    pub fn path(&self, from: &VersionId, to: &VersionId) -> RangePath {
        let range = self.resolve(from, to);
        let versions = self
            .walk(&range)
            .into_iter()
            .map(|idx| self.graph[idx].version.clone())
            .collect();
        RangePath {
            versions,
            warnings: range.warnings,
        }
    }

    /// Union of changes attached to the versions of `path(from, to)`, optionally
    /// restricted to `filter`, ordered by version then category priority.
    #[must_use]
    pub fn changes_in_range(
        &self,
        from: &VersionId,
        to: &VersionId,
        filter: Option<&TypeFilter>,
    ) -> RangeChanges {
        let range = self.resolve(from, to);
        let mut changes = Vec::new();
        for idx in self.walk(&range) {
            let mut version_changes: Vec<&Change> = self.graph[idx]
                .changes()
                .iter()
                .filter(|c| filter.map_or(true, |f| f.contains(c.change_type)))
                .collect();
            version_changes.sort_by_key(|c| c.change_type.priority());
            changes.extend(version_changes.into_iter().cloned());
        }
        RangeChanges {
            changes,
            warnings: range.warnings,
        }
    }

    /// Per-version flags and per-type totals for a range.
    #[must_use]
    pub fn summary(&self, from: &VersionId, to: &VersionId) -> RangeSummary {
        let range = self.resolve(from, to);
        let mut totals = TypeTotals::default();
        let versions = self
            .walk(&range)
            .into_iter()
            .map(|idx| {
                let node = &self.graph[idx];
                for change in node.changes() {
                    totals.add(change.change_type);
                }
                VersionFlagRow {
                    version: node.version.clone(),
                    flags: node.flags(),
                }
            })
            .collect();
        RangeSummary {
            tool: self.tool.clone(),
            from: range.from,
            to: range.to,
            versions,
            totals,
            warnings: range.warnings,
        }
    }

    /// `changes_in_range` and `summary` of the same graph.
    #[must_use]
    pub fn range_report(
        &self,
        from: &VersionId,
        to: &VersionId,
        filter: Option<&TypeFilter>,
    ) -> RangeReport {
        RangeReport {
            changes: self.changes_in_range(from, to, filter),
            summary: self.summary(from, to),
        }
    }

    /// Check that PRECEDES edges form one simple path in version order.
    pub fn validate_chain(&self) -> Result<()> {
        let expected = self.order.len().saturating_sub(1);
        if self.graph.edge_count() != expected {
            return Err(GraphError::BrokenChain(format!(
                "expected {expected} edges, found {}",
                self.graph.edge_count()
            )));
        }
        for pair in self.order.windows(2) {
            if self.graph[pair[0]].version >= self.graph[pair[1]].version {
                return Err(GraphError::BrokenChain(format!(
                    "{} does not sort before {}",
                    self.graph[pair[0]].version, self.graph[pair[1]].version
                )));
            }
            if self.next_index(pair[0]) != Some(pair[1]) {
                return Err(GraphError::BrokenChain(format!(
                    "missing edge {} -> {}",
                    self.graph[pair[0]].version, self.graph[pair[1]].version
                )));
            }
        }
        Ok(())
    }

    fn resolve(&self, from: &VersionId, to: &VersionId) -> ResolvedRange {
        let mut warnings = Vec::new();
        let (from, to) = if from > to {
            warnings.push(RangeWarning::Inverted {
                from: from.clone(),
                to: to.clone(),
            });
            (to.clone(), from.clone())
        } else {
            (from.clone(), to.clone())
        };

        let lo = self
            .order
            .partition_point(|&idx| self.graph[idx].version < from);
        let hi = self
            .order
            .partition_point(|&idx| self.graph[idx].version <= to);
        let in_range = lo < hi;

        if !self.by_version.contains_key(&from) {
            let used = in_range.then(|| self.graph[self.order[lo]].version.clone());
            warnings.push(RangeWarning::FromNotFound {
                requested: from.clone(),
                used,
            });
        }
        if !self.by_version.contains_key(&to) {
            let used = in_range.then(|| self.graph[self.order[hi - 1]].version.clone());
            warnings.push(RangeWarning::ToNotFound {
                requested: to.clone(),
                used,
            });
        }
        if !in_range {
            warnings.push(RangeWarning::EmptyRange {
                from: from.clone(),
                to: to.clone(),
            });
        }
        for warning in &warnings {
            log::warn!("{} {warning}", self.tool);
        }

        ResolvedRange {
            lo,
            hi,
            from,
            to,
            warnings,
        }
    }

    /// Follow PRECEDES edges across the resolved slice.
    fn walk(&self, range: &ResolvedRange) -> Vec<NodeIndex> {
        if range.lo >= range.hi {
            return Vec::new();
        }
        let last = self.order[range.hi - 1];
        let mut out = Vec::with_capacity(range.hi - range.lo);
        let mut current = self.order[range.lo];
        loop {
            out.push(current);
            if current == last {
                return out;
            }
            match self.next_index(current) {
                Some(next) => current = next,
                None => {
                    log::error!(
                        "{}: PRECEDES chain ends at {}; falling back to sorted order",
                        self.tool,
                        self.graph[current].version
                    );
                    return self.order[range.lo..range.hi].to_vec();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use upgrade_extractor::{extract, ChangeType};

    fn v(s: &str) -> VersionId {
        VersionId::parse(s).unwrap()
    }

    fn graph_of(ids: &[&str]) -> VersionGraph {
        let mut graph = VersionGraph::new("kubernetes");
        for id in ids {
            graph.add_version(VersionNode::new("kubernetes", v(id), ""));
        }
        graph.link_in_order();
        graph
    }

    #[test]
    fn link_in_order_builds_simple_chain() {
        let graph = graph_of(&["1.22.0", "1.20.0", "1.21.0"]);
        assert_eq!(graph.edge_count(), 2);
        graph.validate_chain().unwrap();
        assert_eq!(graph.successor(&v("1.20.0")), Some(&v("1.21.0")));
        assert_eq!(graph.predecessor(&v("1.20.0")), None);
        assert_eq!(graph.predecessor(&v("1.22.0")), Some(&v("1.21.0")));
    }

    #[test]
    fn single_version_path() {
        let graph = graph_of(&["1.20.0", "1.21.0"]);
        let path = graph.path(&v("1.21.0"), &v("1.21.0"));
        assert_eq!(path.versions, vec![v("1.21.0")]);
        assert!(path.warnings.is_empty());
    }

    #[test]
    fn missing_bounds_snap_inward_with_warnings() {
        let graph = graph_of(&["1.20.0", "1.21.0", "1.22.0"]);
        let path = graph.path(&v("1.19.0"), &v("1.21.5"));
        assert_eq!(path.versions, vec![v("1.20.0"), v("1.21.0")]);
        assert_eq!(
            path.warnings,
            vec![
                RangeWarning::FromNotFound {
                    requested: v("1.19.0"),
                    used: Some(v("1.20.0")),
                },
                RangeWarning::ToNotFound {
                    requested: v("1.21.5"),
                    used: Some(v("1.21.0")),
                },
            ]
        );
    }

    #[test]
    fn inverted_and_empty_ranges_do_not_fail() {
        let graph = graph_of(&["1.20.0", "1.22.0"]);
        let inverted = graph.path(&v("1.22.0"), &v("1.20.0"));
        assert_eq!(inverted.versions, vec![v("1.20.0"), v("1.22.0")]);
        assert!(matches!(inverted.warnings[0], RangeWarning::Inverted { .. }));

        let empty = graph.path(&v("1.21.0"), &v("1.21.9"));
        assert!(empty.versions.is_empty());
        assert!(empty
            .warnings
            .iter()
            .any(|w| matches!(w, RangeWarning::EmptyRange { .. })));
    }

    #[test]
    fn attach_refreshes_flags_and_rejects_duplicates() {
        let mut graph = graph_of(&["1.21.0"]);
        let changes = extract(
            &v("1.21.0"),
            "- Fixed CVE-2021-25741\n- The foo API is deprecated",
        );
        for change in changes.clone() {
            assert!(graph.attach_change(change).unwrap());
        }
        assert!(!graph.attach_change(changes[0].clone()).unwrap());

        let flags = graph.node(&v("1.21.0")).unwrap().flags();
        assert!(flags.has_security);
        assert!(flags.has_deprecation);
        assert!(!flags.has_breaking);
        assert_eq!(flags.change_count, 2);

        let orphan = extract(&v("9.9.9"), "- Added thing");
        assert!(matches!(
            graph.attach_change(orphan[0].clone()),
            Err(GraphError::VersionNotFound(_))
        ));
    }

    #[test]
    fn filtered_changes_follow_version_then_priority_order() {
        let mut graph = graph_of(&["1.20.0", "1.21.0"]);
        for (id, text) in [
            ("1.21.0", "- Added the shiny thing\n- Breaking change to kubelet flags"),
            ("1.20.0", "- Fixed CVE-2020-8559 redirect"),
        ] {
            for change in extract(&v(id), text) {
                graph.attach_change(change).unwrap();
            }
        }

        let all = graph.changes_in_range(&v("1.20.0"), &v("1.21.0"), None);
        let kinds: Vec<(String, ChangeType)> = all
            .changes
            .iter()
            .map(|c| (c.version.to_string(), c.change_type))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("1.20.0".to_string(), ChangeType::Security),
                ("1.21.0".to_string(), ChangeType::Breaking),
                ("1.21.0".to_string(), ChangeType::Feature),
            ]
        );

        let security = TypeFilter::single(ChangeType::Security);
        let only = graph.changes_in_range(&v("1.20.0"), &v("1.21.0"), Some(&security));
        assert_eq!(only.changes.len(), 1);

        let summary = graph.summary(&v("1.20.0"), &v("1.21.0"));
        assert_eq!(summary.totals.total(), 3);
        assert!(summary.versions[0].flags.has_security);
        assert!(summary.versions[1].flags.has_breaking);
    }
}
