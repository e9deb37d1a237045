use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use upgrade_extractor::{matching_types, ChangeType};
use upgrade_graph::TypeFilter;

/// Question phrasings of a category that release-note patterns miss
/// ("removals", "breaks", "CVEs").
static QUESTION_STEMS: Lazy<Vec<(ChangeType, Regex)>> = Lazy::new(|| {
    [
        (ChangeType::Breaking, r"(?i)\b(break(s|ing)?|incompatib\w*)\b"),
        (ChangeType::Security, r"(?i)\b(secur\w*|cves?|vulnerab\w*)\b"),
        (ChangeType::Removal, r"(?i)\b(remov(al|als|e|ed|es|ing)|delet\w*|drop(s|ped)?)\b"),
        (ChangeType::Deprecation, r"(?i)\b(deprecat\w*|obsolete|legacy)\b"),
    ]
    .into_iter()
    .map(|(change_type, pattern)| {
        (
            change_type,
            Regex::new(pattern).expect("valid question stem pattern"),
        )
    })
    .collect()
});

/// Questions asking for the whole picture are never narrowed.
static SUMMARY_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(summary|summari[sz]e|everything|all\s+changes|overview|upgrade\s+plan|action\s+items?)\b",
    )
    .expect("valid summary marker pattern")
});

/// Why a question produced no type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unfiltered {
    /// The question asks for a summary of everything.
    Summary,
    /// No category vocabulary matched.
    NoMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum QueryType {
    Filtered { filter: TypeFilter },
    Unfiltered { reason: Unfiltered },
}

impl QueryType {
    #[must_use]
    pub fn filter(&self) -> Option<&TypeFilter> {
        match self {
            Self::Filtered { filter } => Some(filter),
            Self::Unfiltered { .. } => None,
        }
    }
}

/// Infers the coarse structural type filter of a question.
pub struct QueryClassifier;

impl QueryClassifier {
    /// Union of every category the question names; unfiltered when it names
    /// none or asks for a summary.
    #[must_use]
    pub fn classify(question: &str) -> QueryType {
        if SUMMARY_MARKERS.is_match(question) {
            return QueryType::Unfiltered {
                reason: Unfiltered::Summary,
            };
        }

        let mut types = matching_types(question);
        types.extend(
            QUESTION_STEMS
                .iter()
                .filter(|(_, re)| re.is_match(question))
                .map(|(change_type, _)| *change_type),
        );

        match TypeFilter::from_types(types) {
            Some(filter) => {
                log::debug!("Question '{question}' -> filter {filter}");
                QueryType::Filtered { filter }
            }
            None => QueryType::Unfiltered {
                reason: Unfiltered::NoMatch,
            },
        }
    }
}
