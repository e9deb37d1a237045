use crate::error::ExtractError;
use crate::version::VersionId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of change categories.
///
/// Declaration order is the classification priority: a line matching several
/// categories is assigned the first one listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Breaking,
    Security,
    Removal,
    Deprecation,
    Feature,
    Other,
}

impl ChangeType {
    pub const ALL: [Self; 6] = [
        Self::Breaking,
        Self::Security,
        Self::Removal,
        Self::Deprecation,
        Self::Feature,
        Self::Other,
    ];

    /// Lower rank wins.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Breaking => 0,
            Self::Security => 1,
            Self::Removal => 2,
            Self::Deprecation => 3,
            Self::Feature => 4,
            Self::Other => 5,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breaking => "breaking",
            Self::Security => "security",
            Self::Removal => "removal",
            Self::Deprecation => "deprecation",
            Self::Feature => "feature",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Breaking => "BREAKING",
            Self::Security => "SECURITY",
            Self::Removal => "REMOVAL",
            Self::Deprecation => "DEPRECATION",
            Self::Feature => "FEATURE",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breaking" => Ok(Self::Breaking),
            "security" => Ok(Self::Security),
            "removal" | "removed" => Ok(Self::Removal),
            "deprecation" | "deprecated" => Ok(Self::Deprecation),
            "feature" => Ok(Self::Feature),
            "other" => Ok(Self::Other),
            other => Err(ExtractError::UnknownChangeType(other.to_string())),
        }
    }
}

/// One classified fact extracted from a version's release notes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Change {
    pub version: VersionId,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    pub raw_line_hash: String,
}

impl Change {
    /// Identity of the change within its tool: `<version>#<raw_line_hash>`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}#{}", self.version, self.raw_line_hash)
    }
}
