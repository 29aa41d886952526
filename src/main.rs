//! seedstat CLI
//!
//! # Commands
//!
//! - `aggregate`: mean ± std per (dataset, configuration)
//! - `topk`: top-K jobs per dataset
//! - `compare`: paper / restored / adapter table plus significance
//! - `all`: every table in one pass
//!
//! Exit code 0 on success (including runs where every job was skipped),
//! 1 on a run-level error.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use seedstat::config::PipelineConfig;
use seedstat::pipeline::{Pipeline, ReportKind};
use seedstat::report::ReportWriter;

/// Aggregate per-seed training logs into summary tables
#[derive(Parser)]
#[command(name = "seedstat")]
#[command(version)]
#[command(about = "Seed-level log aggregation, top-K selection and significance testing")]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregated mean ± std per (dataset, configuration)
    Aggregate(RunArgs),
    /// Top-K jobs per dataset by one metric
    Topk(TopkArgs),
    /// Paper / restored / adapter table and significance tests
    Compare(RunArgs),
    /// All tables
    All(TopkArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Directory holding the .out/.err job logs
    #[arg(short, long, default_value = "logs")]
    log_dir: PathBuf,

    /// Directory the tables are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// JSON configuration file (missing keys use defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write each table as Parquet
    #[arg(long)]
    parquet: bool,

    /// Prefix CSV files with a UTF-8 byte-order mark
    #[arg(long)]
    bom: bool,

    /// Also write a JSON run summary
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct TopkArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Jobs kept per dataset
    #[arg(short, long)]
    k: Option<usize>,

    /// Metric the jobs are ranked by
    #[arg(short, long)]
    metric: Option<String>,
}

fn load_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    config.output.parquet |= args.parquet;
    config.output.bom |= args.bom;
    config.output.json |= args.json;
    Ok(config)
}

fn run(args: &RunArgs, kind: ReportKind, k: Option<usize>, metric: Option<String>) -> Result<()> {
    let mut config = load_config(args)?;
    if let Some(k) = k {
        config.top_k = k;
    }
    if let Some(metric) = metric {
        config.topk_metric = metric;
    }

    let metrics = config.metrics.clone();
    let output = config.output.clone();
    let pipeline = Pipeline::new(config).context("invalid configuration")?;

    let mut writer = ReportWriter::new(&args.out_dir, output, metrics);
    let outcome = pipeline
        .run(&args.log_dir, kind, &mut writer)
        .with_context(|| format!("processing {}", args.log_dir.display()))?;

    info!(
        parsed = outcome.stats.jobs_parsed,
        files = outcome.written.len(),
        "done"
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Aggregate(args) => run(&args, ReportKind::Aggregate, None, None),
        Commands::Compare(args) => run(&args, ReportKind::Compare, None, None),
        Commands::Topk(args) => run(&args.run, ReportKind::TopK, args.k, args.metric),
        Commands::All(args) => run(&args.run, ReportKind::All, args.k, args.metric),
    }
}
