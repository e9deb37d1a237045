use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Canned questions for the common upgrade reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Breaking,
    Deprecations,
    Removals,
    Security,
    Summary,
    ActionItems,
}

impl Preset {
    pub const ALL: [Self; 6] = [
        Self::Breaking,
        Self::Deprecations,
        Self::Removals,
        Self::Security,
        Self::Summary,
        Self::ActionItems,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Breaking => "breaking",
            Self::Deprecations => "deprecations",
            Self::Removals => "removals",
            Self::Security => "security",
            Self::Summary => "summary",
            Self::ActionItems => "action-items",
        }
    }

    #[must_use]
    pub const fn question(self) -> &'static str {
        match self {
            Self::Breaking => {
                "List ALL breaking changes with version numbers, affected components, and required actions"
            }
            Self::Deprecations => {
                "List ALL deprecated features, when they were deprecated, when they'll be removed, and migration paths"
            }
            Self::Removals => {
                "List ALL removed features, what versions they were removed in, and alternatives"
            }
            Self::Security => "List ALL security patches, CVEs fixed, and security-related changes",
            Self::Summary => {
                "Provide a COMPLETE upgrade summary including ALL critical changes, deprecations, removals, and security patches"
            }
            Self::ActionItems => "List ALL action items required for this upgrade in priority order",
        }
    }
}

impl FromStr for Preset {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == wanted)
            .ok_or_else(|| SearchError::UnknownPreset(s.to_string()))
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_classifier::{QueryClassifier, QueryType};
    use upgrade_extractor::ChangeType;

    #[test]
    fn parses_names() {
        assert_eq!("action_items".parse::<Preset>().unwrap(), Preset::ActionItems);
        assert_eq!("Security".parse::<Preset>().unwrap(), Preset::Security);
        assert!("critical".parse::<Preset>().is_err());
    }

    #[test]
    fn category_presets_include_their_category() {
        for (preset, change_type) in [
            (Preset::Breaking, ChangeType::Breaking),
            (Preset::Deprecations, ChangeType::Deprecation),
            (Preset::Removals, ChangeType::Removal),
            (Preset::Security, ChangeType::Security),
        ] {
            let classified = QueryClassifier::classify(preset.question());
            let filter = classified.filter().expect("category preset is filtered");
            assert!(filter.contains(change_type), "{preset}: {filter}");
        }
        assert!(matches!(
            QueryClassifier::classify(Preset::Summary.question()),
            QueryType::Unfiltered { .. }
        ));
        assert!(matches!(
            QueryClassifier::classify(Preset::ActionItems.question()),
            QueryType::Unfiltered { .. }
        ));
    }
}
