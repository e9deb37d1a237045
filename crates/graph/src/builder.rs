use crate::types::{VersionGraph, VersionNode};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use upgrade_extractor::{extract, Change, VersionId, VersionSection};

/// Identifier rejected while building a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedVersion {
    pub input: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub accepted: usize,
    pub changes: usize,
    pub rejected: Vec<RejectedVersion>,
    /// Identifiers seen more than once; the first section was kept.
    pub duplicates: Vec<VersionId>,
}

#[derive(Debug)]
pub struct BuildOutput {
    pub graph: VersionGraph,
    pub report: BuildReport,
}

/// Build the version-sequence graph of one tool from raw version sections
pub struct GraphBuilder {
    tool: String,
}

impl GraphBuilder {
    #[must_use]
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }

    /// Parse identifiers, extract changes in parallel, then link versions in order.
    ///
    /// Malformed identifiers are skipped and reported; they never fail the batch.
    pub fn build(&self, sections: impl IntoIterator<Item = VersionSection>) -> BuildOutput {
        let mut report = BuildReport::default();
        let mut seen: HashSet<VersionId> = HashSet::new();
        let mut accepted: Vec<(VersionId, String)> = Vec::new();

        // Phase 1: parse and deduplicate identifiers
        for section in sections {
            match VersionId::parse(&section.version) {
                Ok(version) => {
                    if seen.insert(version.clone()) {
                        accepted.push((version, section.text));
                    } else {
                        log::warn!("{}: duplicate version {version} ignored", self.tool);
                        report.duplicates.push(version);
                    }
                }
                Err(err) => {
                    log::warn!("{}: skipping version section: {err}", self.tool);
                    report.rejected.push(RejectedVersion {
                        input: section.version,
                        error: err.to_string(),
                    });
                }
            }
        }

        // Phase 2: extraction is independent per version
        let extracted: Vec<(VersionId, String, Vec<Change>)> = accepted
            .into_par_iter()
            .map(|(version, text)| {
                let changes = extract(&version, &text);
                (version, text, changes)
            })
            .collect();

        // Phase 3: nodes, changes and PRECEDES edges
        let mut graph = VersionGraph::new(self.tool.clone());
        for (version, text, changes) in extracted {
            let mut node = VersionNode::new(self.tool.clone(), version, text);
            for change in changes {
                if node.attach(change) {
                    report.changes += 1;
                }
            }
            graph.add_version(node);
        }
        graph.link_in_order();
        report.accepted = graph.version_count();

        log::info!(
            "Built version graph for {}: {} versions, {} edges, {} changes ({} rejected)",
            self.tool,
            graph.version_count(),
            graph.edge_count(),
            report.changes,
            report.rejected.len()
        );

        BuildOutput { graph, report }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn section(version: &str, text: &str) -> VersionSection {
        VersionSection {
            version: version.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn rejects_bad_identifiers_and_keeps_batch() {
        let output = GraphBuilder::new("kubernetes").build(vec![
            section("1.20.0", "- Added thing"),
            section("one.two", "- Added other thing"),
            section("v1.21.0", "- Removed the foo gate"),
            section("1.20.0", "- duplicate section"),
        ]);

        assert_eq!(output.graph.version_count(), 2);
        assert_eq!(output.report.accepted, 2);
        assert_eq!(output.report.changes, 2);
        assert_eq!(output.report.rejected.len(), 1);
        assert_eq!(output.report.rejected[0].input, "one.two");
        assert_eq!(
            output.report.duplicates,
            vec![VersionId::parse("1.20.0").unwrap()]
        );
        output.graph.validate_chain().unwrap();
    }

    #[test]
    fn flags_reflect_extracted_changes() {
        let output = GraphBuilder::new("kubernetes").build(vec![section(
            "1.24.0",
            "- Dockershim was removed from kubelet\n- Fixed CVE-2022-3294",
        )]);
        let node = output
            .graph
            .node(&VersionId::parse("1.24.0").unwrap())
            .unwrap();
        let flags = node.flags();
        assert!(flags.has_removal);
        assert!(flags.has_security);
        assert_eq!(flags.change_count, 2);
        assert!(flags.is_critical());
    }
}
