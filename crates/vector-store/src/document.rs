use serde::{Deserialize, Serialize};
use upgrade_extractor::{Change, ChangeType, VersionId};

/// Projection a document was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// A chunk of one version's entire normalized notes.
    FullContent,
    /// Canonical one-line rendering of a single change.
    AtomicChange,
}

impl DocumentKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullContent => "full",
            Self::AtomicChange => "change",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub tool: String,
    pub version: VersionId,
    pub kind: DocumentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_type: Option<ChangeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Chunk sequence number of a full-content document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<usize>,
    /// `raw_line_hash` of the change behind an atomic document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_hash: Option<String>,
}

/// Indexable text unit plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub meta: DocumentMeta,
}

impl Document {
    /// Stable id of the `seq`-th full-content chunk of a version.
    #[must_use]
    pub fn full_content_id(tool: &str, version: &VersionId, seq: usize) -> String {
        format!(
            "{tool}/{version}/{}/{seq}",
            DocumentKind::FullContent.as_str()
        )
    }

    /// Stable id of the atomic document of a change.
    #[must_use]
    pub fn atomic_id(tool: &str, change: &Change) -> String {
        format!(
            "{tool}/{}/{}/{}",
            change.version,
            DocumentKind::AtomicChange.as_str(),
            change.raw_line_hash
        )
    }

    #[must_use]
    pub fn full_content(tool: &str, version: &VersionId, seq: usize, text: String) -> Self {
        Self {
            id: Self::full_content_id(tool, version, seq),
            text,
            meta: DocumentMeta {
                tool: tool.to_string(),
                version: version.clone(),
                kind: DocumentKind::FullContent,
                change_type: None,
                component: None,
                seq: Some(seq),
                change_hash: None,
            },
        }
    }

    #[must_use]
    pub fn atomic(tool: &str, change: &Change, text: String) -> Self {
        Self {
            id: Self::atomic_id(tool, change),
            text,
            meta: DocumentMeta {
                tool: tool.to_string(),
                version: change.version.clone(),
                kind: DocumentKind::AtomicChange,
                change_type: Some(change.change_type),
                component: change.component.clone(),
                seq: None,
                change_hash: Some(change.raw_line_hash.clone()),
            },
        }
    }

    #[must_use]
    pub fn is_atomic(&self) -> bool {
        self.meta.kind == DocumentKind::AtomicChange
    }
}

/// Restriction applied to a similarity query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// Inclusive lower version bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<VersionId>,
    /// Inclusive upper version bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<VersionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DocumentKind>,
}

impl QueryFilter {
    #[must_use]
    pub fn range(tool: impl Into<String>, from: VersionId, to: VersionId) -> Self {
        Self {
            tool: Some(tool.into()),
            from: Some(from),
            to: Some(to),
            kind: None,
        }
    }

    #[must_use]
    pub fn matches(&self, meta: &DocumentMeta) -> bool {
        self.tool.as_deref().map_or(true, |tool| tool == meta.tool)
            && self.from.as_ref().map_or(true, |from| &meta.version >= from)
            && self.to.as_ref().map_or(true, |to| &meta.version <= to)
            && self.kind.map_or(true, |kind| kind == meta.kind)
    }
}

/// Document returned by a similarity query with its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: Document,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use upgrade_extractor::extract;

    fn v(s: &str) -> VersionId {
        VersionId::parse(s).unwrap()
    }

    #[test]
    fn ids_are_stable_per_version_kind_and_sequence() {
        assert_eq!(
            Document::full_content_id("kubernetes", &v("1.24.0"), 2),
            "kubernetes/1.24.0/full/2"
        );

        let change = &extract(&v("1.24.0"), "- Dockershim removed from kubelet")[0];
        let doc = Document::atomic("kubernetes", change, "x".into());
        assert_eq!(
            doc.id,
            format!("kubernetes/1.24.0/change/{}", change.raw_line_hash)
        );
        assert_eq!(doc.meta.change_type, Some(ChangeType::Removal));
        assert!(doc.is_atomic());
    }

    #[test]
    fn filter_bounds_are_inclusive() {
        let filter = QueryFilter::range("helm", v("3.1.0"), v("3.3.0"));
        let meta = |tool: &str, version: &str| {
            Document::full_content(tool, &v(version), 0, String::new()).meta
        };
        assert!(filter.matches(&meta("helm", "3.1.0")));
        assert!(filter.matches(&meta("helm", "3.3.0")));
        assert!(!filter.matches(&meta("helm", "3.3.1")));
        assert!(!filter.matches(&meta("helm", "3.1.0-rc.1")));
        assert!(!filter.matches(&meta("terraform", "3.2.0")));
    }

    #[test]
    fn meta_serializes_snake_case() {
        let doc = Document::full_content("helm", &v("3.1.0"), 0, "text".into());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["meta"]["kind"], "full_content");
        assert_eq!(json["meta"]["version"], "3.1.0");
        assert!(json["meta"].get("change_type").is_none());
    }
}
