use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use upgrade_extractor::DEFAULT_MIN_SECTION_CHARS;
use upgrade_indexer::IndexerConfig;
use upgrade_search::{RetrieveOptions, DEFAULT_K, DEFAULT_PASS_TIMEOUT};
use upgrade_vector_store::DocumentTemplates;

/// `upgrade-scout` configuration file.
///
/// Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoutConfig {
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub indexer: IndexerConfig,
    #[serde(default)]
    pub sections: SectionsConfig,
    /// Text of indexed documents; shared by indexing and retrieval.
    #[serde(default)]
    pub templates: DocumentTemplates,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_pass_timeout_ms")]
    pub pass_timeout_ms: u64,
}

fn default_k() -> usize {
    DEFAULT_K
}

fn default_pass_timeout_ms() -> u64 {
    #[allow(clippy::cast_possible_truncation)]
    let ms = DEFAULT_PASS_TIMEOUT.as_millis() as u64;
    ms
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            pass_timeout_ms: default_pass_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionsConfig {
    /// Minimum non-heading content for a changelog section to be kept.
    #[serde(default = "default_min_section_chars")]
    pub min_section_chars: usize,
}

fn default_min_section_chars() -> usize {
    DEFAULT_MIN_SECTION_CHARS
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            min_section_chars: default_min_section_chars(),
        }
    }
}

impl ScoutConfig {
    /// Load from `path`, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config
            .indexer
            .validate()
            .with_context(|| format!("Invalid [indexer] table in {}", path.display()))?;
        config
            .templates
            .validate()
            .with_context(|| format!("Invalid [templates] table in {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Retrieval options with `k` overridden by the command line.
    #[must_use]
    pub fn retrieve_options(&self, k: Option<usize>) -> RetrieveOptions {
        RetrieveOptions {
            k: k.unwrap_or(self.retrieval.k),
            pass_timeout: Duration::from_millis(self.retrieval.pass_timeout_ms),
            deadline: None,
        }
    }
}
