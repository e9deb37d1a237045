use crate::error::{IndexerError, Result};
use serde::{Deserialize, Serialize};

/// Shape of full-content chunks and of index submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Maximum bytes of one full-content chunk.
    #[serde(default = "default_max_unit_chars")]
    pub max_unit_chars: usize,
    /// Share of `max_unit_chars` repeated at the start of the next chunk.
    #[serde(default = "default_overlap_fraction")]
    pub overlap_fraction: f32,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Retries of the failed subset of a batch.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

fn default_max_unit_chars() -> usize {
    1500
}

fn default_overlap_fraction() -> f32 {
    0.2
}

fn default_batch_size() -> usize {
    64
}

fn default_max_retries() -> usize {
    2
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            max_unit_chars: default_max_unit_chars(),
            overlap_fraction: default_overlap_fraction(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
        }
    }
}

impl IndexerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_unit_chars < 64 {
            return Err(IndexerError::InvalidConfig(format!(
                "max_unit_chars must be at least 64 (got {})",
                self.max_unit_chars
            )));
        }
        if !(0.0..=0.5).contains(&self.overlap_fraction) {
            return Err(IndexerError::InvalidConfig(format!(
                "overlap_fraction must be in [0, 0.5] (got {})",
                self.overlap_fraction
            )));
        }
        if self.batch_size == 0 {
            return Err(IndexerError::InvalidConfig(
                "batch_size must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Overlap between adjacent chunks in bytes.
    #[must_use]
    pub fn overlap_chars(&self) -> usize {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let overlap = (self.max_unit_chars as f32 * self.overlap_fraction).round() as usize;
        overlap
    }
}
