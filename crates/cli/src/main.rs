//! CLI application for MEV Lens transaction analysis.

mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use mev_lens_heuristics::{AnalysisConfig, TransactionSummary};
use mev_lens_ingestion::{RetryPolicy, RpcConfig, SolanaRpcClient, TransactionAnalyzer};
use mev_lens_source::{MemorySource, TransactionSource};
use mev_lens_telemetry::{init_logging, Metrics};
use tracing::{info, warn};

/// Jupiter aggregator program.
const DEFAULT_PROGRAM: &str = "JUP4Fb2cqiRUcaTHdrPC8h2gNsA2ETXiPDD33WcGuJB";

#[derive(Parser)]
#[command(name = "mev-lens")]
#[command(about = "Heuristic MEV detection for individual Solana transactions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RpcArgs {
    /// Solana JSON-RPC URL, used instead of the Helius endpoint
    #[arg(long, env = "MEV_LENS_RPC_URL")]
    rpc_url: Option<String>,

    /// Helius API key for the default endpoint
    #[arg(long, env = "HELIUS_API_KEY", default_value = "", hide_env_values = true)]
    helius_api_key: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    request_timeout_seconds: u64,

    /// Attempts per RPC request
    #[arg(long, default_value = "3")]
    max_retries: usize,
}

#[derive(Args)]
struct OutputArgs {
    /// Analysis config JSON (reference data and classifier thresholds)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    /// Append one JSON line per analyzed transaction to this file
    #[arg(long)]
    sample_output_path: Option<PathBuf>,

    /// Write the summaries as CSV
    #[arg(long)]
    csv_output: Option<PathBuf>,

    /// Write Prometheus metrics in text format after the run
    #[arg(long)]
    metrics_output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze recent transactions of an address
    Analyze {
        /// Account or program address
        #[arg(long, default_value = DEFAULT_PROGRAM)]
        address: String,

        /// Number of transactions to analyze
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Transactions analyzed concurrently
        #[arg(long, default_value = "4")]
        concurrency: usize,

        #[command(flatten)]
        rpc: RpcArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Analyze a single transaction by signature
    Single {
        signature: String,

        #[command(flatten)]
        rpc: RpcArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Analyze transactions recorded in a JSON file of getTransaction results
    Replay {
        path: PathBuf,

        /// Transactions analyzed concurrently
        #[arg(long, default_value = "4")]
        concurrency: usize,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            address,
            limit,
            concurrency,
            rpc,
            output,
        } => {
            init_logging(output.log_level.as_deref())?;
            run_analyze(&address, limit, concurrency, &rpc, &output).await?;
        }
        Commands::Single {
            signature,
            rpc,
            output,
        } => {
            init_logging(output.log_level.as_deref())?;
            run_single(&signature, &rpc, &output).await?;
        }
        Commands::Replay {
            path,
            concurrency,
            output,
        } => {
            init_logging(output.log_level.as_deref())?;
            run_replay(&path, concurrency, &output).await?;
        }
    }

    Ok(())
}

async fn run_analyze(
    address: &str,
    limit: usize,
    concurrency: usize,
    rpc: &RpcArgs,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    info!("Analyzing {} recent transactions for {}", limit, address);

    let metrics = Metrics::new()?;
    let client = Arc::new(SolanaRpcClient::new(rpc_config(rpc), metrics.clone())?);
    let signatures: Vec<String> = client
        .get_signatures_for_address(address, limit)
        .await?
        .into_iter()
        .map(|info| info.signature)
        .collect();

    if signatures.is_empty() {
        println!("No transactions found");
        return Ok(());
    }

    let analyzer = build_analyzer(client, output, metrics.clone())?;
    let mut summaries = analyzer.analyze_batch(&signatures, concurrency).await;
    summaries.sort_by(|a, b| b.slot.cmp(&a.slot));

    print_batch(&summaries);
    finish(output, &summaries, &metrics)
}

async fn run_single(signature: &str, rpc: &RpcArgs, output: &OutputArgs) -> anyhow::Result<()> {
    let metrics = Metrics::new()?;
    let client = Arc::new(SolanaRpcClient::new(rpc_config(rpc), metrics.clone())?);
    let analyzer = build_analyzer(client, output, metrics.clone())?;

    let summaries: Vec<TransactionSummary> = analyzer.analyze(signature).await.into_iter().collect();
    match summaries.first() {
        Some(summary) => println!("{}", report::render_summary(summary)),
        None => println!("Failed to analyze transaction"),
    }

    finish(output, &summaries, &metrics)
}

async fn run_replay(path: &Path, concurrency: usize, output: &OutputArgs) -> anyhow::Result<()> {
    let metrics = Metrics::new()?;
    let source = MemorySource::from_json_file(path)?;
    let signatures = source.signatures();
    if signatures.is_empty() {
        println!("No transactions found");
        return Ok(());
    }

    let analyzer = build_analyzer(Arc::new(source), output, metrics.clone())?;
    let mut summaries = analyzer.analyze_batch(&signatures, concurrency).await;
    summaries.sort_by(|a, b| b.slot.cmp(&a.slot));

    print_batch(&summaries);
    finish(output, &summaries, &metrics)
}

fn rpc_config(args: &RpcArgs) -> RpcConfig {
    let mut config = match args.rpc_url {
        Some(ref url) => RpcConfig::new(url.clone()),
        None => {
            if args.helius_api_key.is_empty() {
                warn!("No RPC URL or Helius API key configured, requests will likely be rejected");
            }
            RpcConfig::helius(&args.helius_api_key)
        }
    };
    config.request_timeout = Duration::from_secs(args.request_timeout_seconds);
    config.retry = RetryPolicy {
        max_attempts: args.max_retries,
        ..RetryPolicy::default()
    };
    config
}

fn build_analyzer(
    source: Arc<dyn TransactionSource>,
    output: &OutputArgs,
    metrics: Metrics,
) -> anyhow::Result<TransactionAnalyzer> {
    let config = match output.config {
        Some(ref path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };

    Ok(TransactionAnalyzer::new(source, config, metrics)
        .with_sample_output(output.sample_output_path.clone()))
}

fn print_batch(summaries: &[TransactionSummary]) {
    for summary in summaries {
        println!("{}\n", report::render_summary(summary));
    }
    if let Some(table) = report::render_statistics(&report::BatchStatistics::from_summaries(summaries)) {
        println!("{}", table);
    }
}

fn finish(output: &OutputArgs, summaries: &[TransactionSummary], metrics: &Metrics) -> anyhow::Result<()> {
    if let Some(ref path) = output.csv_output {
        report::write_csv(path, summaries)?;
    }
    if let Some(ref path) = output.metrics_output {
        std::fs::write(path, metrics.gather()?)?;
        info!("Wrote metrics to {:?}", path);
    }
    Ok(())
}
