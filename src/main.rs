//! AISANS crawler main entry point
//!
//! This is the command-line interface for the AISANS crawler and its
//! full-text index.

use aisans_crawler::config::{load_config_with_hash, load_seeds, Config};
use aisans_crawler::crawler::{build_http_client, run_crawl};
use aisans_crawler::output::{
    documents_from_results, load_statistics, print_search_hits, print_search_results,
    print_statistics,
};
use aisans_crawler::search::{MetaSearch, SearchProvider};
use aisans_crawler::storage::{open_store, to_match_query, Document, DocumentStore};
use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// AISANS: a breadth-first crawler feeding a full-text search index
///
/// Crawls outward from seed URLs, indexes every page into an SQLite FTS5
/// store, and periodically re-seeds the frontier from external search
/// results.
#[derive(Parser, Debug)]
#[command(name = "aisans-crawler")]
#[command(version)]
#[command(about = "A breadth-first crawler feeding a full-text index", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH", default_value = "config/crawler.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Search the local index and exit
    #[arg(long, value_name = "QUERY", group = "mode")]
    search: Option<String>,

    /// Query the external search engines and exit
    #[arg(long, value_name = "QUERY", group = "mode")]
    metasearch: Option<String>,

    /// Import JSON-lines documents into the index and exit
    #[arg(long, value_name = "FILE", group = "mode")]
    import: Option<PathBuf>,

    /// Show statistics from the database and exit
    #[arg(long, group = "mode")]
    stats: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, group = "mode")]
    dry_run: bool,

    /// Maximum number of results for --search / per engine for --metasearch
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Pass the --search query to FTS5 unmodified
    #[arg(long, requires = "search")]
    raw_query: bool,

    /// Write --metasearch results into the index
    #[arg(long, requires = "metasearch")]
    index: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if let Some(query) = &cli.search {
        handle_search(&config, query, cli.limit, cli.raw_query)?;
    } else if let Some(query) = &cli.metasearch {
        handle_metasearch(&config, query, cli.limit, cli.index).await?;
    } else if let Some(path) = &cli.import {
        handle_import(&config, path)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("aisans_crawler=info,warn"),
            1 => EnvFilter::new("aisans_crawler=debug,info"),
            2 => EnvFilter::new("aisans_crawler=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== AISANS Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Snippet length: {}", config.crawler.snippet_length);
    println!("  Seed file: {}", config.crawler.seed_file);

    println!("\nRe-seeding:");
    if config.reseed.enabled {
        println!("  Every {} pages", config.reseed.interval_pages);
        println!("  Engines: {}", config.reseed.engines.join(", "));
        println!("  Results per engine: {}", config.reseed.results_per_engine);
        println!("  Prefer summary: {}", config.reseed.prefer_summary);
        println!("  Fallback: {:?}", config.reseed.fallback);
    } else {
        println!("  Disabled");
    }

    println!("\nSummarizer:");
    if config.summarizer.enabled {
        println!("  Model: {}", config.summarizer.model);
        println!("  Endpoint: {}", config.summarizer.base_url);
        println!("  API key variable: {}", config.summarizer.api_key_env);
    } else {
        println!("  Disabled");
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());
    println!("  Timeout: {}s", config.user_agent.timeout_secs);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let seeds = load_seeds(Path::new(&config.crawler.seed_file), &config.crawler.seed_urls)
        .context("Failed to load seeds")?;
    println!("\nSeeds ({}):", seeds.len());
    for seed in &seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", seeds.len());

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_store(Path::new(&config.output.database_path))
        .context("Failed to open document store")?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --search mode: ranked search over the local index
fn handle_search(config: &Config, query: &str, limit: usize, raw: bool) -> anyhow::Result<()> {
    let store = open_store(Path::new(&config.output.database_path))
        .context("Failed to open document store")?;

    let match_query = if raw {
        query.to_string()
    } else {
        to_match_query(query)
    };
    tracing::debug!("FTS5 query: {}", match_query);

    let hits = store.search(&match_query, limit)?;
    print_search_hits(query, &hits);

    Ok(())
}

/// Handles the --metasearch mode: queries the external engines
async fn handle_metasearch(
    config: &Config,
    query: &str,
    limit: usize,
    index: bool,
) -> anyhow::Result<()> {
    let client = build_http_client(&config.user_agent)?;
    let meta = MetaSearch::from_config(client, &config.search);
    tracing::debug!("Registered search engines: {}", meta.engine_names().join(", "));

    let results = meta.search(query, &config.reseed.engines, limit).await?;
    print_search_results(query, &results);

    if index {
        let mut store = open_store(Path::new(&config.output.database_path))
            .context("Failed to open document store")?;
        let written = store.upsert_batch(&documents_from_results(&results))?;
        println!("✓ Indexed {} of {} results", written, results.len());
    }

    Ok(())
}

/// Handles the --import mode: loads JSON-lines documents into the index
fn handle_import(config: &Config, path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut documents = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Document>(line) {
            Ok(doc) => documents.push(doc),
            Err(e) => tracing::warn!("Skipping line {}: {}", line_no + 1, e),
        }
    }

    let mut store = open_store(Path::new(&config.output.database_path))
        .context("Failed to open document store")?;
    let written = store.upsert_batch(&documents)?;

    println!("✓ Imported {} documents from {}", written, path.display());
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Max depth: {}, max pages: {}, re-seed: {}",
        config.crawler.max_depth,
        config.crawler.max_pages,
        if config.reseed.enabled { "on" } else { "off" }
    );

    match run_crawl(config, config_hash).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed successfully: {} pages, {} documents, {} fetch failures, {} re-seed cycles",
                report.pages_processed,
                report.documents_indexed,
                report.fetch_failures,
                report.reseed_cycles
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
