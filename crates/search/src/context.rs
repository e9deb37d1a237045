use crate::bundle::{BundleItem, ContextBundle, Provenance};
use crate::error::Result;
use async_trait::async_trait;
use std::fmt::Write as _;
use upgrade_graph::VersionFlags;

pub const COMPLETENESS_DIRECTIVE: &str = "Every change marked [structural] was found by an exact query over the version range. \
Represent every one of them in the answer, with its version number. Never omit a change.";

/// Text handed to answer generation: directive, degraded label, flag summary,
/// then every document in bundle order.
#[must_use]
pub fn render_context(bundle: &ContextBundle) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Upgrade analysis for {} from {} to {}.",
        bundle.tool, bundle.from, bundle.to
    );
    let _ = writeln!(out, "{COMPLETENESS_DIRECTIVE}");
    if bundle.degraded {
        let _ = writeln!(
            out,
            "DEGRADED: partial context (semantic: {}; structural: {}). Do not present it as exhaustive.",
            bundle.semantic.describe(),
            bundle.structural.describe()
        );
    }
    for warning in &bundle.warnings {
        let _ = writeln!(out, "Note: {warning}");
    }

    if let Some(summary) = &bundle.summary {
        let _ = writeln!(out, "\nVersion flags:");
        for row in &summary.versions {
            let _ = writeln!(out, "- {}: {}", row.version, flag_line(&row.flags));
        }
        let t = &summary.totals;
        let _ = writeln!(
            out,
            "Totals: breaking={} security={} removal={} deprecation={} feature={} other={}",
            t.breaking, t.security, t.removal, t.deprecation, t.feature, t.other
        );
    }

    let _ = writeln!(out, "\nDocuments:");
    for (n, item) in bundle.items.iter().enumerate() {
        let _ = writeln!(out, "{}. {} {}", n + 1, item_tag(item), item.document.text);
    }
    out
}

fn flag_line(flags: &VersionFlags) -> String {
    let mut marks = Vec::new();
    if flags.has_breaking {
        marks.push("BREAKING");
    }
    if flags.has_security {
        marks.push("SECURITY");
    }
    if flags.has_removal {
        marks.push("REMOVAL");
    }
    if flags.has_deprecation {
        marks.push("DEPRECATION");
    }
    if marks.is_empty() {
        format!("{} changes", flags.change_count)
    } else {
        format!("{} changes [{}]", flags.change_count, marks.join(" "))
    }
}

fn item_tag(item: &BundleItem) -> String {
    match (item.provenance, item.score) {
        (Provenance::Structural, _) => "[structural]".to_string(),
        (Provenance::Both, Some(score)) => format!("[structural, similarity {score:.2}]"),
        (Provenance::Both, None) => "[structural]".to_string(),
        (Provenance::Semantic, Some(score)) => format!("[similarity {score:.2}]"),
        (Provenance::Semantic, None) => "[similarity]".to_string(),
    }
}

/// Answer-generation collaborator.
///
/// Implementations receive the bundle unmodified and must honor
/// [`COMPLETENESS_DIRECTIVE`].
#[async_trait]
pub trait AnswerComposer: Send + Sync {
    async fn compose(&self, question: &str, bundle: &ContextBundle) -> Result<String>;
}

/// Composer that answers with the rendered context itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextEcho;

#[async_trait]
impl AnswerComposer for ContextEcho {
    async fn compose(&self, question: &str, bundle: &ContextBundle) -> Result<String> {
        Ok(format!("Question: {question}\n\n{}", render_context(bundle)))
    }
}
