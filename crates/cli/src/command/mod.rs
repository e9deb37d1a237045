mod pipeline;

use pipeline::Pipeline;

use crate::config::ScoutConfig;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Write as _;
use std::path::PathBuf;
use upgrade_extractor::{ChangeType, VersionId};
use upgrade_graph::{RangeChanges, RangePath, TypeFilter};
use upgrade_search::{AnswerComposer, ContextEcho, HybridRetriever, Preset};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

/// Tool, version range and changelog directory shared by every subcommand.
#[derive(Debug, Clone, clap::Args)]
pub struct RangeArgs {
    /// Tool name; changelogs are read from `<source>/<tool>/`
    #[arg(long)]
    pub tool: String,

    /// Current version
    #[arg(long)]
    pub from: VersionId,

    /// Target version
    #[arg(long)]
    pub to: VersionId,

    /// Directory holding `<tool>/CHANGELOG-<major.minor>.md` files
    #[arg(long, value_name = "DIR")]
    pub source: PathBuf,
}

/// Question given directly or through a preset.
#[derive(Debug, Clone)]
pub enum Question {
    Text(String),
    Preset(Preset),
}

impl Question {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Preset(preset) => preset.question(),
        }
    }
}

pub struct CommandHandler {
    config: ScoutConfig,
}

impl CommandHandler {
    pub fn new(config: ScoutConfig) -> Self {
        Self { config }
    }

    /// Ingest, build and index; report the pipeline stats and range summary.
    pub async fn analyze(&self, range: &RangeArgs) -> Result<String> {
        let pipeline = self.load(range, true).await?;
        let summary = pipeline.graph(&range.tool)?.summary(&range.from, &range.to);
        to_json(&json!({
            "pipeline": pipeline.report,
            "summary": summary,
        }))
    }

    pub async fn ask(
        &self,
        range: &RangeArgs,
        question: &Question,
        k: Option<usize>,
        format: OutputFormat,
    ) -> Result<String> {
        let pipeline = self.load(range, true).await?;
        let retriever = HybridRetriever::with_templates(
            pipeline.store.clone(),
            pipeline.index.clone(),
            self.config.templates.clone(),
        )?;
        let options = self.config.retrieve_options(k);
        let bundle = retriever
            .retrieve(
                &range.tool,
                &range.from,
                &range.to,
                question.text(),
                &options,
            )
            .await
            .context("Retrieval failed")?;

        match format {
            OutputFormat::Json => to_json(&bundle),
            OutputFormat::Text => Ok(ContextEcho.compose(question.text(), &bundle).await?),
        }
    }

    /// Structural query only; no similarity index is built.
    pub async fn changes(
        &self,
        range: &RangeArgs,
        types: &[ChangeType],
        format: OutputFormat,
    ) -> Result<String> {
        let pipeline = self.load(range, false).await?;
        let filter = TypeFilter::from_types(types.iter().copied());
        let changes = pipeline
            .graph(&range.tool)?
            .changes_in_range(&range.from, &range.to, filter.as_ref());
        match format {
            OutputFormat::Json => to_json(&changes),
            OutputFormat::Text => Ok(render_changes(&changes)),
        }
    }

    pub async fn path(&self, range: &RangeArgs, format: OutputFormat) -> Result<String> {
        let pipeline = self.load(range, false).await?;
        let path = pipeline.graph(&range.tool)?.path(&range.from, &range.to);
        match format {
            OutputFormat::Json => to_json(&path),
            OutputFormat::Text => Ok(render_path(&path)),
        }
    }

    async fn load(&self, range: &RangeArgs, with_index: bool) -> Result<Pipeline> {
        Pipeline::load(
            &self.config,
            &range.source,
            &range.tool,
            &range.from,
            &range.to,
            with_index,
        )
        .await
    }
}

fn to_json(value: &impl Serialize) -> Result<String> {
    let value: Value = serde_json::to_value(value)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

fn render_changes(changes: &RangeChanges) -> String {
    let mut out = String::new();
    for warning in &changes.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    for change in &changes.changes {
        let _ = writeln!(
            out,
            "{} [{}] {}",
            change.version,
            change.change_type.label(),
            change.description
        );
    }
    out
}

fn render_path(path: &RangePath) -> String {
    let mut out = String::new();
    for warning in &path.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    let versions: Vec<String> = path.versions.iter().map(ToString::to_string).collect();
    let _ = writeln!(out, "{}", versions.join(" -> "));
    out
}
