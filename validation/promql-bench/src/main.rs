//! Query benchmark CLI for Prometheus-compatible endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use promql_bench::{
    load_queries, BenchConfig, ConfigOverrides, Dispatcher, OutputFormat, PromClient, StatsReport,
};

#[derive(Parser, Debug)]
#[command(name = "promql-bench")]
#[command(about = "Replay PromQL range queries concurrently and report latency", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every query in a file against the target and summarize latency
    Benchmark(BenchmarkArgs),
}

#[derive(clap::Args, Debug)]
struct BenchmarkArgs {
    /// Query file to process (required unless given by the scenario)
    #[arg(long)]
    filepath: Option<PathBuf>,

    /// Number of concurrent workers [default: 1]
    #[arg(long)]
    workers: Option<usize>,

    /// Promscale web address. The scheme defaults to 'https' if not provided
    /// [default: http://localhost:9201]
    #[arg(long = "promscale.url", env = "PROMSCALE_URL")]
    url: Option<String>,

    /// Query API version [default: v1]
    #[arg(long)]
    api_version: Option<String>,

    /// Per-request timeout in milliseconds [default: 1000]
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// YAML scenario file; flags override its values
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Output format: table (default), text, json, csv
    #[arg(short, long, default_value = "table")]
    output: String,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

impl BenchmarkArgs {
    fn resolve_config(&self) -> Result<BenchConfig> {
        let base = match &self.scenario {
            Some(path) => BenchConfig::from_file(path)
                .with_context(|| format!("loading scenario {}", path.display()))?,
            None => BenchConfig::default(),
        };

        let config = base.with_overrides(ConfigOverrides {
            filepath: self.filepath.clone(),
            workers: self.workers,
            url: self.url.clone(),
            api_version: self.api_version.clone(),
            timeout_ms: self.timeout_ms,
        });
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    match cli.command {
        Commands::Benchmark(args) => run_benchmark(args).await,
    }
}

async fn run_benchmark(args: BenchmarkArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let format: OutputFormat = args.output.parse().map_err(anyhow::Error::msg)?;

    info!(
        filepath = %config.filepath.display(),
        workers = config.workers,
        url = %config.url,
        "Loaded configuration"
    );

    let queries = load_queries(&config.filepath)
        .with_context(|| format!("reading query file {}", config.filepath.display()))?;
    if queries.is_empty() {
        warn!(filepath = %config.filepath.display(), "Query file contains no queries");
    }

    let client = PromClient::new(&config.url, &config.api_version, config.timeout())?;
    info!(target_url = %client.base_url(), queries = queries.len(), "Starting benchmark");

    let dispatcher = Dispatcher::new(Arc::new(client), config.workers)?
        .with_progress(!args.no_progress && format != OutputFormat::Json);
    let batch = dispatcher.run(queries).await;
    let stats = batch.statistics();

    println!("{}", StatsReport::render(&stats, format)?);
    Ok(())
}
