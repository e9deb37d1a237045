use crate::error::{IndexerError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Text-fetch collaborator: the complete changelog of one `major.minor` line.
#[async_trait]
pub trait ChangelogSource: Send + Sync {
    async fn fetch(&self, tool: &str, major_minor: &str) -> Result<String>;
}

/// Reads `<root>/<tool>/CHANGELOG-<major.minor>.md`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path_for(&self, tool: &str, major_minor: &str) -> PathBuf {
        self.root
            .join(tool)
            .join(format!("CHANGELOG-{major_minor}.md"))
    }
}

#[async_trait]
impl ChangelogSource for DirectorySource {
    async fn fetch(&self, tool: &str, major_minor: &str) -> Result<String> {
        let path = self.path_for(tool, major_minor);
        log::debug!("Reading changelog {}", path.display());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| IndexerError::Fetch {
                tool: tool.to_string(),
                line: major_minor.to_string(),
                reason: format!("{}: {err}", path.display()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn reads_per_line_changelog_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("kubernetes")).unwrap();
        std::fs::write(
            dir.path().join("kubernetes/CHANGELOG-1.24.md"),
            "# v1.24.0\n- Dockershim removed",
        )
        .unwrap();

        let source = DirectorySource::new(dir.path());
        let text = source.fetch("kubernetes", "1.24").await.unwrap();
        assert!(text.contains("Dockershim"));

        let missing = source.fetch("kubernetes", "1.25").await;
        assert!(matches!(
            missing,
            Err(IndexerError::Fetch { ref line, .. }) if line == "1.25"
        ));
    }
}
