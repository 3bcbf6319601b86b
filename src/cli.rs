use crate::config::{AnalyzerConfig, ConfigOverrides, FileConfig};
use crate::git::GitLogSource;
use crate::model::RunReport;
use crate::pipeline;
use crate::tables::{self, View};
use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gcontrib")]
#[command(about = "Git contribution analyzer: author, repository, daily and timeline reports")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[arg(short, long, action = ArgAction::Count, global = true, help = "Log more (-v info, -vv debug)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    #[arg(long = "repo", help = "Path to git repository (repeatable)")]
    pub repos: Vec<PathBuf>,

    #[arg(long, help = "First day to include (YYYY-MM-DD, RFC3339, or relative like '90 days ago')")]
    pub since: Option<String>,

    #[arg(long, help = "Last day to include (defaults to today)")]
    pub until: Option<String>,

    #[arg(long = "alias", value_name = "KEY=NAME", help = "Map an email or name to a canonical author (repeatable)")]
    pub aliases: Vec<String>,

    #[arg(long = "exclude", value_name = "KEY", help = "Drop commits by this email or name (repeatable)")]
    pub exclude: Vec<String>,

    #[arg(long, help = "Skip merge commits")]
    pub no_merges: bool,

    #[arg(long, help = "Hide progress spinners")]
    pub no_progress: bool,
}

impl CommonArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            repositories: self.repos.clone(),
            since: self.since.clone(),
            until: self.until.clone(),
            aliases: self.aliases.clone(),
            excluded_authors: self.exclude.clone(),
            no_merges: self.no_merges,
            output_dir: None,
            top_contributors: None,
        }
    }

    fn show_progress(&self) -> bool {
        !self.no_progress && console::Term::stderr().is_term()
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Per-author commit and line totals
    Authors {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// Per-repository totals
    Repos {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// Activity per calendar day
    Daily {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// One entry per commit
    Log {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// Monthly commit timeline of the top contributors
    Timeline {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Number of contributors to show")]
        top: Option<usize>,
    },
    /// Write all report files to a directory
    Report {
        #[arg(long, help = "Directory for report files")]
        output_dir: Option<PathBuf>,
    },
}

/// Loads and validates the configuration, then runs the pipeline over every
/// configured repository.
pub fn analyze(common: &CommonArgs, overrides: ConfigOverrides) -> Result<(AnalyzerConfig, RunReport)> {
    let file = match &common.config {
        Some(path) => FileConfig::load(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => FileConfig::default(),
    };
    let config = AnalyzerConfig::build(file, overrides, Local::now().date_naive())
        .context("Invalid configuration")?;

    tracing::info!(
        "Analyzing {} repositories for commits between {} and {}",
        config.repositories.len(),
        config.window.start,
        config.window.end
    );
    tracing::debug!(
        aliases = config.resolver.aliases().len(),
        excluded = config.resolver.excluded().len(),
        include_merges = config.include_merges,
        "Author rules loaded"
    );

    let source = GitLogSource::new(config.include_merges, common.show_progress());
    let report = pipeline::run(&config, &source);
    Ok((config, report))
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        let common = &self.common;
        match self.command {
            Commands::Authors { json, ndjson } => tables::exec(common, View::Authors, json, ndjson),
            Commands::Repos { json, ndjson } => tables::exec(common, View::Repos, json, ndjson),
            Commands::Daily { json, ndjson } => tables::exec(common, View::Daily, json, ndjson),
            Commands::Log { json, ndjson } => tables::exec(common, View::Log, json, ndjson),
            Commands::Timeline { json, top } => crate::timeline::exec(common, json, top),
            Commands::Report { output_dir } => crate::report::exec(common, output_dir),
        }
    }
}
