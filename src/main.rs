//! Keyword Crawler main entry point
//!
//! This is the command-line interface for the keyword crawler.

use anyhow::Context;
use clap::Parser;
use keyword_crawler::config::{load_config_with_hash, validate, CrawlConfig, Preferences};
use keyword_crawler::output::{print_summary, TracingSink};
use keyword_crawler::Crawler;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Keyword Crawler: a polite, multi-worker keyword miner
///
/// Starting from a seed URL, the crawler fetches pages while respecting
/// robots.txt, counts words, links and keyword hits on every page, and
/// reports running averages until the page limit is reached.
#[derive(Parser, Debug)]
#[command(name = "keyword-crawler")]
#[command(version)]
#[command(about = "A polite, multi-worker keyword miner", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the seed URL
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Keyword to count; repeat to track several (replaces configured keywords)
    #[arg(short, long = "keyword", value_name = "WORD")]
    keywords: Vec<String>,

    /// Override the page limit
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    apply_overrides(&mut config, &cli);
    setup_logging(cli.verbose, cli.quiet, config.crawl.debug);
    tracing::info!(
        "Loaded configuration from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    validate(&config).context("invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

fn apply_overrides(config: &mut CrawlConfig, cli: &Cli) {
    if let Some(seed) = &cli.seed {
        config.crawl.seed_url = seed.clone();
    }
    if !cli.keywords.is_empty() {
        config.crawl.keywords = cli.keywords.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawl.max_pages = max_pages;
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, debug: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose.max(u8::from(debug)) {
            0 => EnvFilter::new("keyword_crawler=info,warn"),
            1 => EnvFilter::new("keyword_crawler=debug,info"),
            2 => EnvFilter::new("keyword_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &CrawlConfig) {
    println!("=== Keyword Crawler Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed URL: {}", config.crawl.seed_url);
    println!("  Page limit: {}", config.crawl.max_pages);
    println!("  Debug: {}", config.crawl.debug);

    println!("\nKeywords ({}):", config.crawl.keywords.len());
    for keyword in &config.crawl.keywords {
        println!("  - {}", keyword);
    }

    println!("\nWorkers:");
    println!("  Fetchers: {}", config.workers.fetchers);
    println!("  Parsers: {}", config.workers.parsers);
    println!("  Poll interval: {}ms", config.workers.poll_interval_ms);
    println!("  Shutdown grace: {}ms", config.workers.shutdown_grace_ms);

    println!("\nNetwork:");
    println!("  User agent: {}", config.network.user_agent);
    println!("  Request timeout: {}ms", config.network.request_timeout_ms);
    println!("  robots.txt timeout: {}ms", config.network.robots_timeout_ms);
    println!(
        "  Crawl delay: {} (capped at {}s)",
        if config.network.honor_crawl_delay {
            "honored"
        } else {
            "ignored"
        },
        config.network.max_crawl_delay_secs
    );

    println!("\nBlacklist ({}):", config.network.blacklist.len());
    for entry in &config.network.blacklist {
        println!("  - {}", entry);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
///
/// The crawl ends when it runs out of work or on Ctrl-C; either way the
/// workers are shut down and the summary is printed.
async fn handle_crawl(config: CrawlConfig) -> anyhow::Result<()> {
    let prefs = Arc::new(Preferences::new());
    prefs.set_debug(config.crawl.debug);
    prefs.set_max_pages(config.crawl.max_pages);

    tracing::info!(
        "Crawling from {} for {} keywords",
        config.crawl.seed_url,
        config.crawl.keywords.len()
    );

    let mut crawler = Crawler::new(config, prefs)?;
    crawler.start(TracingSink)?;
    crawler.seed();

    tokio::select! {
        result = crawler.wait_until_idle() => result?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            tracing::warn!("Interrupted, stopping workers");
        }
    }

    let summary = crawler.shutdown().await?;
    print_summary(&summary);
    Ok(())
}
