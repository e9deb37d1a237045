use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_MIN_SECTION_CHARS: usize = 50;

static VERSION_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#{1,4}\s*[vV]?(\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?)\b")
        .expect("valid version heading pattern")
});

/// Raw text of one version section, identifier not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSection {
    pub version: String,
    pub text: String,
}

/// Split a changelog document into per-version sections.
///
/// A section starts at a heading of depth 1-4 whose text begins with a version
/// identifier and runs until the next such heading. Sections with fewer than
/// `min_chars` characters of body text are dropped; a repeated heading keeps
/// the first section.
#[must_use]
pub fn split_sections(document: &str, min_chars: usize) -> Vec<VersionSection> {
    let mut sections = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in document.lines() {
        if let Some(caps) = VERSION_HEADING.captures(line) {
            if let Some((version, lines)) = current.take() {
                push_section(&mut sections, &mut seen, version, &lines, min_chars);
            }
            current = Some((caps[1].to_string(), vec![line]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }
    if let Some((version, lines)) = current {
        push_section(&mut sections, &mut seen, version, &lines, min_chars);
    }

    log::debug!("Split changelog into {} version sections", sections.len());
    sections
}

fn push_section(
    sections: &mut Vec<VersionSection>,
    seen: &mut HashSet<String>,
    version: String,
    lines: &[&str],
    min_chars: usize,
) {
    let body_chars: usize = lines
        .iter()
        .skip(1)
        .map(|l| l.trim().chars().count())
        .sum();
    if body_chars < min_chars {
        log::debug!("Dropping short section {version} ({body_chars} chars)");
        return;
    }
    if !seen.insert(version.clone()) {
        log::debug!("Ignoring repeated section heading {version}");
        return;
    }
    sections.push(VersionSection {
        version,
        text: lines.join("\n"),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CHANGELOG: &str = "\
# Table of contents
- intro line that belongs to no version

# v1.21.1
## Changes by Kind
- Fixed CVE-2021-25735 in node update validation

# v1.21.0
## Deprecation
- CronJob batch/v1beta1 API is deprecated, use batch/v1

## v1.21.0-rc.0
tiny

### 1.21.1
- repeated heading, must be ignored because the first section won
";

    #[test]
    fn splits_on_version_headings() {
        let sections = split_sections(CHANGELOG, 10);
        let ids: Vec<&str> = sections.iter().map(|s| s.version.as_str()).collect();
        assert_eq!(ids, vec!["1.21.1", "1.21.0"]);
        assert!(sections[0].text.starts_with("# v1.21.1"));
        assert!(sections[0].text.contains("CVE-2021-25735"));
        assert!(!sections[0].text.contains("batch/v1beta1"));
    }

    #[test]
    fn min_chars_filters_short_sections() {
        let sections = split_sections(CHANGELOG, 0);
        let ids: Vec<&str> = sections.iter().map(|s| s.version.as_str()).collect();
        assert_eq!(ids, vec!["1.21.1", "1.21.0", "1.21.0-rc.0"]);
    }

    #[test]
    fn no_headings_no_sections() {
        assert!(split_sections("just prose\nwith no versions", 0).is_empty());
    }
}
