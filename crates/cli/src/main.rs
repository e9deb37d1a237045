//! `upgrade-scout`: upgrade analysis over per-release-line changelogs

mod command;
mod config;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use command::{CommandHandler, OutputFormat, Question, RangeArgs};
use config::ScoutConfig;
use std::path::PathBuf;
use upgrade_extractor::ChangeType;
use upgrade_search::Preset;

#[derive(Parser)]
#[command(name = "upgrade-scout", version)]
#[command(about = "Find every breaking, security, removal and deprecation change between two versions", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest, build and index a range; print the per-version summary
    Analyze {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Answer a question about a range from the merged retrieval context
    #[command(group(ArgGroup::new("query").required(true).args(["question", "preset"])))]
    Ask {
        #[command(flatten)]
        range: RangeArgs,

        /// Free-form question
        #[arg(short, long)]
        question: Option<String>,

        /// Canned question: breaking, deprecations, removals, security, summary, action-items
        #[arg(short, long)]
        preset: Option<Preset>,

        /// Similarity results to request
        #[arg(short)]
        k: Option<usize>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the changes of a range, optionally restricted to types
    Changes {
        #[command(flatten)]
        range: RangeArgs,

        /// Change type to keep (repeatable)
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        types: Vec<ChangeType>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Print the ordered versions of a range
    Path {
        #[command(flatten)]
        range: RangeArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = ScoutConfig::load(cli.config.as_deref())?;
    let handler = CommandHandler::new(config);

    let output = match cli.command {
        Commands::Analyze { range } => handler.analyze(&range).await?,
        Commands::Ask {
            range,
            question,
            preset,
            k,
            format,
        } => {
            let question = match (question, preset) {
                (Some(text), _) => Question::Text(text),
                (None, Some(preset)) => Question::Preset(preset),
                (None, None) => anyhow::bail!("either --question or --preset is required"),
            };
            handler.ask(&range, &question, k, format).await?
        }
        Commands::Changes {
            range,
            types,
            format,
        } => handler.changes(&range, &types, format).await?,
        Commands::Path { range, format } => handler.path(&range, format).await?,
    };

    println!("{}", output.trim_end());
    Ok(())
}
