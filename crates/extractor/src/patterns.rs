//! Table-driven category matching.
//!
//! Each category owns an include set and an optional exclude set. The table is
//! evaluated in priority order and the first category whose include set
//! matches (and whose exclude set does not) wins.

use crate::change::ChangeType;
use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};

pub struct CategoryMatcher {
    pub change_type: ChangeType,
    include: RegexSet,
    exclude: Option<RegexSet>,
}

impl CategoryMatcher {
    fn new(change_type: ChangeType, include: &[&str], exclude: &[&str]) -> Self {
        let include = RegexSet::new(include).expect("valid category include patterns");
        let exclude = if exclude.is_empty() {
            None
        } else {
            Some(RegexSet::new(exclude).expect("valid category exclude patterns"))
        };
        Self {
            change_type,
            include,
            exclude,
        }
    }

    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.include.is_match(text)
            && !self
                .exclude
                .as_ref()
                .is_some_and(|exclude| exclude.is_match(text))
    }
}

/// Categories in priority order. `Other` has no patterns of its own.
static CATEGORY_TABLE: Lazy<Vec<CategoryMatcher>> = Lazy::new(|| {
    vec![
        CategoryMatcher::new(
            ChangeType::Breaking,
            &[
                r"(?i)\bbreaking\s+changes?\b",
                r"(?i)\bremoved?\b.*\b(apis?|features?|support)\b",
                r"(?i)\bmust\b.*\b(update|change|migrate)\b",
                r"(?i)\bno\s+longer\b",
                r"(?i)\baction\s+required\b",
                r"(?i)\bincompatib(le|ility)\b",
            ],
            &[],
        ),
        CategoryMatcher::new(
            ChangeType::Security,
            &[
                r"(?i)\bsecurity\b",
                r"(?i)\bcve-\d{4}-\d{4,}\b",
                r"(?i)\bvulnerabilit(y|ies)\b",
                r"(?i)\bexploit(s|able|ed)?\b",
            ],
            &[],
        ),
        CategoryMatcher::new(
            ChangeType::Removal,
            &[r"(?i)\b(removed|deleted|dropped)\b"],
            // a future removal is a deprecation notice
            &[r"(?i)\bwill\s+be\s+(removed|deleted|dropped)\b"],
        ),
        CategoryMatcher::new(
            ChangeType::Deprecation,
            &[
                r"(?i)\bdeprecat(e|es|ed|ion|ions|ing)\b",
                r"(?i)\bwill\s+be\s+removed\b",
                r"(?i)\blegacy\b",
                r"(?i)\bobsolete\b",
            ],
            &[],
        ),
        CategoryMatcher::new(
            ChangeType::Feature,
            &[
                r"(?i)\bnew\b",
                r"(?i)\badd(ed|s)\b",
                r"(?i)\bnow\s+supports?\b",
                r"(?i)\bga\b",
                r"(?i)\bintroduc(ed|es)\b",
                r"(?i)\bgraduat(ed|es)\b",
            ],
            &[],
        ),
    ]
});

/// Headings whose bullets count as notable even when no category matches.
static NOTABLE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(changes\s+by\s+kind|notable\s+changes?|urgent\s+upgrade\s+notes|what'?s\s+(changed|new)|api\s+changes?|bug\s+or\s+regression|other\s+\(cleanup|uncategorized)",
    )
    .expect("valid notable heading pattern")
});

/// Highest-priority category matching `line`; never returns `Other`.
#[must_use]
pub fn classify_line(line: &str) -> Option<ChangeType> {
    CATEGORY_TABLE
        .iter()
        .find(|matcher| matcher.is_match(line))
        .map(|matcher| matcher.change_type)
}

/// Every category whose patterns match `text`, in priority order.
#[must_use]
pub fn matching_types(text: &str) -> Vec<ChangeType> {
    CATEGORY_TABLE
        .iter()
        .filter(|matcher| matcher.is_match(text))
        .map(|matcher| matcher.change_type)
        .collect()
}

#[must_use]
pub fn is_notable_heading(heading: &str) -> bool {
    NOTABLE_HEADING.is_match(heading)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaking_patterns() {
        for line in [
            "This is a breaking change for operators",
            "Removed the deprecated extensions/v1beta1 API",
            "Users must migrate to the new endpoint",
            "kubelet no longer accepts --foo",
            "ACTION REQUIRED: rotate certificates",
        ] {
            assert_eq!(classify_line(line), Some(ChangeType::Breaking), "{line}");
        }
    }

    #[test]
    fn security_patterns() {
        for line in [
            "Fixed CVE-2021-25741 in subpath handling",
            "Addresses a vulnerability in the API server",
            "security: bump golang to 1.16.7",
        ] {
            assert_eq!(classify_line(line), Some(ChangeType::Security), "{line}");
        }
    }

    #[test]
    fn removal_patterns() {
        assert_eq!(
            classify_line("The alpha DynamicKubeletConfig gate was dropped"),
            Some(ChangeType::Removal)
        );
        assert_eq!(
            classify_line("Deleted unused metrics from scheduler"),
            Some(ChangeType::Removal)
        );
    }

    #[test]
    fn future_removal_is_deprecation() {
        assert_eq!(
            classify_line("The flag will be removed in v1.27"),
            Some(ChangeType::Deprecation)
        );
        assert_eq!(
            classify_line("PodSecurityPolicy is deprecated and removed from docs"),
            Some(ChangeType::Removal)
        );
    }

    #[test]
    fn removal_of_deprecated_item_is_removal() {
        let line = "- Removed the deprecated `--dynamic-config-dir` flag from the kubelet";
        assert_eq!(classify_line(line), Some(ChangeType::Removal));
        assert_eq!(
            matching_types(line),
            vec![ChangeType::Removal, ChangeType::Deprecation]
        );
    }

    #[test]
    fn deprecation_patterns() {
        for line in [
            "CronJob batch/v1beta1 API is deprecated, use batch/v1",
            "Deprecation of the legacy scheduler policy config",
            "kube-proxy userspace mode is obsolete",
        ] {
            assert_eq!(classify_line(line), Some(ChangeType::Deprecation), "{line}");
        }
    }

    #[test]
    fn feature_patterns() {
        for line in [
            "Added support for ephemeral containers",
            "IPv6 dual-stack is now GA",
            "kubectl now supports events subcommand",
        ] {
            assert_eq!(classify_line(line), Some(ChangeType::Feature), "{line}");
        }
    }

    #[test]
    fn breaking_wins_over_deprecation() {
        let line = "Breaking change: the deprecated v1beta1 endpoint is gone";
        assert_eq!(
            matching_types(line),
            vec![ChangeType::Breaking, ChangeType::Deprecation]
        );
        assert_eq!(classify_line(line), Some(ChangeType::Breaking));
    }

    #[test]
    fn breaking_wins_over_security() {
        let line = "Breaking change to fix a security issue in token handling";
        assert_eq!(classify_line(line), Some(ChangeType::Breaking));
    }

    #[test]
    fn unmatched_lines_are_not_classified() {
        assert_eq!(classify_line("Updated docs for kubeadm"), None);
        assert_eq!(classify_line("Bumped golang.org/x/net"), None);
    }

    #[test]
    fn notable_headings() {
        assert!(is_notable_heading("## Changes by Kind"));
        assert!(is_notable_heading("### Bug or Regression"));
        assert!(!is_notable_heading("## Downloads for v1.21.0"));
    }
}
