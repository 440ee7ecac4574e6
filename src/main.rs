//! # tradecrawl CLI Application
//!
//! Command-line interface for the marketplace harvester.
//!
//! ## Subcommands
//!
//! - `crawl`: Crawl the search results for a query and save a deduplicated CSV
//! - `analyze`: Summarize a saved dataset and write chart artifacts
//!
//! Progress lines are printed to stdout; logs go to stderr and are filtered
//! with `RUST_LOG`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::instrument;
use tradecrawl::analysis::{self, AnalysisError};
use tradecrawl::crawler::{CrawlEvent, CrawlerConfig, DEFAULT_BASE_URL, SelectorConfig};
use tradecrawl::logging::init_logging;
use tradecrawl::pipeline::crawl_and_persist;
use tradecrawl::store::{DEFAULT_DATASET_PATH, RecordStore, StoreConfig};

#[derive(Parser)]
#[command(author, version, about = "Harvest product listings from a B2B marketplace search", long_about = None)]
struct Cli {
    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl search results and save them as CSV
    Crawl(CrawlArgs),

    /// Summarize a saved dataset
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Search query, e.g. "industrial pumps"
    #[arg(required = true)]
    query: String,

    /// Maximum number of result pages to crawl
    #[arg(short = 'p', long, default_value = "3")]
    max_pages: u32,

    /// Destination CSV file
    #[arg(short, long, default_value = DEFAULT_DATASET_PATH)]
    output: PathBuf,

    /// Search endpoint
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// JSON file overriding the CSS selectors
    #[arg(long)]
    selectors: Option<PathBuf>,

    /// Per-request timeout in seconds (no timeout by default)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Minimum delay between pages in milliseconds
    #[arg(long, default_value = "2000")]
    min_delay_ms: u64,

    /// Maximum (exclusive) delay between pages in milliseconds
    #[arg(long, default_value = "5000")]
    max_delay_ms: u64,

    /// Seed for user agent and delay randomness
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Dataset produced by `crawl`
    #[arg(short, long, default_value = DEFAULT_DATASET_PATH)]
    input: PathBuf,

    /// Directory for chart artifacts (defaults to the dataset's directory)
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_file.as_deref())?;

    match cli.command {
        Some(Commands::Crawl(args)) => {
            crawl_command(args).await?;
        }
        Some(Commands::Analyze(args)) => {
            analyze_command(args)?;
        }
        None => {
            // If no command is provided, show help
            let _ = Cli::parse_from(["tradecrawl", "--help"]);
        }
    }

    Ok(())
}

#[instrument]
async fn crawl_command(args: CrawlArgs) -> anyhow::Result<()> {
    let selectors = match &args.selectors {
        Some(path) => SelectorConfig::read_config(path).await?,
        None => SelectorConfig::default(),
    };

    let config = CrawlerConfig::builder()
        .base_url(args.base_url.clone())
        .max_pages(args.max_pages)
        .delay_ms(args.min_delay_ms, args.max_delay_ms)
        .timeout(args.timeout_secs.map(Duration::from_secs))
        .seed(args.seed)
        .selectors(selectors)
        .build();

    // Print progress lines as the crawl reports them
    let (progress_sender, mut progress_receiver) = mpsc::channel::<CrawlEvent>(100);
    let progress_handle = tokio::spawn(async move {
        while let Some(event) = progress_receiver.recv().await {
            println!("{}", event);
        }
    });

    let store = RecordStore::with_config(StoreConfig {
        path: args.output.clone(),
    });
    let harvest = crawl_and_persist(&config, &args.query, &store, Some(progress_sender)).await;

    // The sender is gone either way, so the printer drains and exits
    let _ = progress_handle.await;
    let harvest = harvest?;

    if let Some(stopped) = harvest.report.stopped_at {
        println!(
            "Stopped early at page {} (status {})",
            stopped.page, stopped.status
        );
    }
    println!(
        "Data saved to {} ({} records)",
        store.path().display(),
        harvest.written
    );

    Ok(())
}

#[instrument]
fn analyze_command(args: AnalyzeArgs) -> anyhow::Result<()> {
    println!("Starting analysis of {}...", args.input.display());

    let out_dir = args.out_dir.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default()
    });

    match analysis::analyze(&args.input, &out_dir) {
        Ok(report) => {
            println!();
            print!("{}", report);
            Ok(())
        }
        Err(AnalysisError::SourceMissing(path)) => {
            println!(
                "File not found: {}. Please run the crawler first.",
                path.display()
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
