use crate::error::{IndexerError, Result};
use crate::source::ChangelogSource;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use upgrade_extractor::{split_sections, VersionId, VersionSection};

/// A release line that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineFailure {
    pub line: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// `major.minor` lines requested, in fetch order.
    pub lines: Vec<String>,
    pub sections: Vec<VersionSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<LineFailure>,
    /// Version headings seen again in a later line; the first one was kept.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub duplicates: Vec<String>,
}

/// Release lines to fetch for a range.
///
/// Every minor between the endpoints when the majors agree, otherwise only
/// the two endpoint lines.
#[must_use]
pub fn release_lines(from: &VersionId, to: &VersionId) -> Vec<String> {
    let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
    if lo.major == hi.major {
        (lo.minor..=hi.minor)
            .map(|minor| format!("{}.{minor}", lo.major))
            .collect()
    } else {
        vec![lo.major_minor(), hi.major_minor()]
    }
}

/// Fetch, split and deduplicate the version sections of a range.
///
/// A line that fails to fetch is logged and recorded; the rest proceed. When
/// every line fails the first fetch error is returned.
pub async fn ingest(
    source: &dyn ChangelogSource,
    tool: &str,
    from: &VersionId,
    to: &VersionId,
    min_section_chars: usize,
) -> Result<IngestReport> {
    let mut report = IngestReport {
        lines: release_lines(from, to),
        ..IngestReport::default()
    };
    let mut seen: HashSet<String> = HashSet::new();
    let mut first_error: Option<IndexerError> = None;

    for line in &report.lines {
        let text = match source.fetch(tool, line).await {
            Ok(text) => text,
            Err(err) => {
                log::warn!("Skipping {tool} {line}: {err}");
                report.failures.push(LineFailure {
                    line: line.clone(),
                    error: err.to_string(),
                });
                first_error.get_or_insert(err);
                continue;
            }
        };

        let sections = split_sections(&text, min_section_chars);
        log::debug!("{tool} {line}: {} version sections", sections.len());
        for section in sections {
            let key = VersionId::parse(&section.version)
                .map_or_else(|_| section.version.clone(), |v| v.to_string());
            if seen.insert(key) {
                report.sections.push(section);
            } else {
                report.duplicates.push(section.version);
            }
        }
    }

    if report.failures.len() == report.lines.len() {
        if let Some(err) = first_error {
            return Err(err);
        }
    }

    log::info!(
        "Ingested {} version sections for {tool} from {} lines ({} failed)",
        report.sections.len(),
        report.lines.len(),
        report.failures.len()
    );
    Ok(report)
}
