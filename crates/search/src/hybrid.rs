use crate::bundle::{ContextBundle, PassStatus};
use crate::error::{Result, SearchError};
use crate::merge::merge;
use crate::query_classifier::QueryClassifier;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use upgrade_extractor::{Change, VersionId};
use upgrade_graph::{GraphStore, RangeSummary, RangeWarning, TypeFilter};
use upgrade_vector_store::{DocumentTemplates, QueryFilter, SearchHit, SimilarityIndex};

pub const DEFAULT_K: usize = 10;
pub const DEFAULT_PASS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveOptions {
    /// Semantic results requested.
    pub k: usize,
    /// Budget of each pass; a pass over budget contributes nothing.
    pub pass_timeout: Duration,
    /// Caller deadline covering both passes.
    pub deadline: Option<Instant>,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            pass_timeout: DEFAULT_PASS_TIMEOUT,
            deadline: None,
        }
    }
}

impl RetrieveOptions {
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

struct StructuralResult {
    changes: Vec<Change>,
    summary: RangeSummary,
    warnings: Vec<RangeWarning>,
}

/// Hybrid retrieval: similarity query plus exact range query, merged so that
/// no structurally present change is ever dropped.
pub struct HybridRetriever {
    graph: Arc<dyn GraphStore>,
    index: Arc<dyn SimilarityIndex>,
    templates: DocumentTemplates,
}

impl HybridRetriever {
    #[must_use]
    pub fn new(graph: Arc<dyn GraphStore>, index: Arc<dyn SimilarityIndex>) -> Self {
        Self {
            graph,
            index,
            templates: DocumentTemplates::default(),
        }
    }

    /// Atomic documents are rendered with `templates`; use the indexer's
    /// templates so both passes agree on document text.
    pub fn with_templates(
        graph: Arc<dyn GraphStore>,
        index: Arc<dyn SimilarityIndex>,
        templates: DocumentTemplates,
    ) -> Result<Self> {
        templates.validate()?;
        Ok(Self {
            graph,
            index,
            templates,
        })
    }

    /// Retrieve the context bundle for `question` over `[from, to]`.
    ///
    /// Both passes run concurrently, each under `pass_timeout`. A failed or
    /// late pass marks the bundle degraded; both failing is an error, as is the
    /// caller deadline expiring before the merge.
    pub async fn retrieve(
        &self,
        tool: &str,
        from: &VersionId,
        to: &VersionId,
        question: &str,
        options: &RetrieveOptions,
    ) -> Result<ContextBundle> {
        if question.trim().is_empty() {
            return Err(SearchError::EmptyQuestion);
        }
        if options
            .deadline
            .is_some_and(|deadline| deadline <= Instant::now())
        {
            return Err(SearchError::DeadlineExceeded);
        }

        let query_type = QueryClassifier::classify(question);
        let filter = query_type.filter().cloned();
        log::debug!(
            "Hybrid retrieve: tool={tool}, range={from}..{to}, k={}, filter={}",
            options.k,
            filter
                .as_ref()
                .map_or_else(|| "all".to_string(), ToString::to_string)
        );

        let semantic = run_pass(
            "semantic",
            options.pass_timeout,
            self.semantic_pass(tool, from, to, question, options.k),
        );
        let structural = run_pass(
            "structural",
            options.pass_timeout,
            self.structural_pass(tool, from, to, filter.as_ref()),
        );
        let passes = async { tokio::join!(semantic, structural) };

        let (semantic, structural) = match options.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, passes)
                .await
                .map_err(|_| {
                    log::warn!("Deadline exceeded for {tool} {from}..{to}; discarding passes");
                    SearchError::DeadlineExceeded
                })?,
            None => passes.await,
        };

        let (semantic_hits, semantic_status) = match semantic {
            Ok(hits) => {
                let results = hits.len();
                (hits, PassStatus::Ok { results })
            }
            Err(status) => (Vec::new(), status),
        };
        let (structural, structural_status) = match structural {
            Ok(result) => {
                let results = result.changes.len();
                (Some(result), PassStatus::Ok { results })
            }
            Err(status) => (None, status),
        };

        if !semantic_status.is_ok() && !structural_status.is_ok() {
            return Err(SearchError::BothSourcesUnavailable {
                semantic: semantic_status.describe(),
                structural: structural_status.describe(),
            });
        }

        let (changes, summary, warnings) = match structural {
            Some(result) => (result.changes, Some(result.summary), result.warnings),
            None => (Vec::new(), None, Vec::new()),
        };
        let items = merge(tool, &changes, semantic_hits, &self.templates)?;
        let degraded = !semantic_status.is_ok() || !structural_status.is_ok();
        if degraded {
            log::warn!(
                "Degraded retrieval for {tool} {from}..{to} (semantic: {}; structural: {})",
                semantic_status.describe(),
                structural_status.describe()
            );
        }

        log::info!(
            "Retrieved {} items for {tool} {from}..{to} ({} structural)",
            items.len(),
            changes.len()
        );

        Ok(ContextBundle {
            tool: tool.to_string(),
            from: from.clone(),
            to: to.clone(),
            question: question.to_string(),
            query_type,
            items,
            summary,
            degraded,
            semantic: semantic_status,
            structural: structural_status,
            warnings,
        })
    }

    async fn semantic_pass(
        &self,
        tool: &str,
        from: &VersionId,
        to: &VersionId,
        question: &str,
        k: usize,
    ) -> std::result::Result<Vec<SearchHit>, String> {
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
        let filter = QueryFilter::range(tool, lo.clone(), hi.clone());
        let hits = self
            .index
            .query(question, k, &filter)
            .await
            .map_err(|err| err.to_string())?;
        // The index is a collaborator; keep only what the range admits.
        Ok(hits
            .into_iter()
            .filter(|hit| filter.matches(&hit.document.meta))
            .take(k)
            .collect())
    }

    async fn structural_pass(
        &self,
        tool: &str,
        from: &VersionId,
        to: &VersionId,
        filter: Option<&TypeFilter>,
    ) -> std::result::Result<StructuralResult, String> {
        let report = self
            .graph
            .range_report(tool, from, to, filter)
            .await
            .map_err(|err| err.to_string())?;
        Ok(StructuralResult {
            changes: report.changes.changes,
            summary: report.summary,
            warnings: report.changes.warnings,
        })
    }
}

async fn run_pass<T>(
    name: &str,
    budget: Duration,
    pass: impl Future<Output = std::result::Result<T, String>>,
) -> std::result::Result<T, PassStatus> {
    match tokio::time::timeout(budget, pass).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(reason)) => {
            log::warn!("{name} pass unavailable: {reason}");
            Err(PassStatus::Unavailable { reason })
        }
        Err(_) => {
            log::warn!("{name} pass timed out after {budget:?}");
            #[allow(clippy::cast_possible_truncation)]
            let after_ms = budget.as_millis() as u64;
            Err(PassStatus::TimedOut { after_ms })
        }
    }
}
