//! Steeple main entry point
//!
//! This is the command-line interface for the Steeple site structure crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use steeple::config::{load_config_with_hash, Config};
use steeple::output::{load_statistics, print_statistics, write_crawl_report, write_json};
use steeple::storage::{open_storage, Storage};
use steeple::{CrawlResult, Crawler};
use tracing_subscriber::EnvFilter;

/// Steeple: organization website structure discovery
///
/// Steeple crawls an organization's homepage, resolves intro and frame
/// landing pages, extracts the navigation tree, popups and boards, walks
/// them breadth-first within a page budget, and stores the discovered
/// structure and dictionary.
#[derive(Parser, Debug)]
#[command(name = "steeple")]
#[command(version = "1.0.0")]
#[command(about = "Organization website structure crawler", long_about = None)]
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

    /// Crawl this homepage instead of the configured one
    #[arg(long, value_name = "URL")]
    homepage: Option<String>,

    /// Validate config and show the effective crawl options without crawling
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show stored statistics for the organization and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Crawl without saving to the database and write only the report
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,

    /// Also write the full crawl result as JSON
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(homepage) = cli.homepage {
        tracing::info!("Overriding homepage with {}", homepage);
        config.organization.homepage = homepage;
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(&config, &config_hash, !cli.export_summary, cli.json.as_deref()).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("steeple=info,warn"),
            1 => EnvFilter::new("steeple=debug,info"),
            2 => EnvFilter::new("steeple=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows the effective options
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let crawler = Crawler::from_config(config)?;
    let options = crawler.options();

    println!("=== Steeple Dry Run ===\n");

    println!("Organization:");
    println!("  Name: {}", config.organization.name);
    println!("  Code: {}", config.organization.code);
    println!("  Homepage: {}", config.organization.homepage);

    println!("\nCrawl Options:");
    println!("  Max depth: {}", options.max_depth);
    println!("  Max pages: {}", options.max_pages);
    println!("  Delay: {}ms", options.delay_ms);
    println!("  Deep crawl: {}", options.deep_crawl);
    println!("  Extract contacts: {}", options.extract_contacts);
    println!("  Extract media: {}", options.extract_media);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);

    match &config.analyzer {
        Some(analyzer) => {
            println!("\nStructure Analyzer:");
            println!("  Endpoint: {}", analyzer.endpoint);
            println!("  Max HTML chars: {}", analyzer.max_html_chars);
            println!("  Timeout: {}s", analyzer.timeout_secs);
        }
        None => println!("\nStructure Analyzer: not configured (pattern extraction only)"),
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows stored statistics for the organization
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    // Open the database
    let storage = open_storage(Path::new(&config.output.database_path))?;

    // Load statistics
    let stats = load_statistics(&storage, &config.organization.code)?;

    // Print statistics
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
///
/// With `persist` false (the --export-summary mode) the result only goes to
/// the markdown report and the optional JSON file.
async fn handle_crawl(
    config: &Config,
    config_hash: &str,
    persist: bool,
    json_path: Option<&Path>,
) -> anyhow::Result<()> {
    let crawler = Crawler::from_config(config)?;

    tracing::info!(
        "Crawling {} ({}), max depth {}, max pages {}",
        config.organization.name,
        config.organization.homepage,
        crawler.options().max_depth,
        crawler.options().max_pages
    );

    let result = crawler.crawl().await;

    if persist {
        let mut storage = open_storage(Path::new(&config.output.database_path))?;
        let report = storage
            .save_crawl(&result, config_hash)
            .context("Failed to save crawl result")?;
        tracing::info!(
            "Saved to {} ({} pages, {} rows skipped)",
            config.output.database_path,
            report.pages,
            report.failed_rows
        );
    }

    let summary_path = Path::new(&config.output.summary_path);
    write_crawl_report(&result, summary_path).context("Failed to write crawl report")?;
    tracing::info!("Report written to {}", summary_path.display());

    if let Some(path) = json_path {
        write_json(&result, path).context("Failed to write JSON export")?;
        tracing::info!("JSON written to {}", path.display());
    }

    log_summary(&result);

    if result.success {
        Ok(())
    } else {
        anyhow::bail!(
            "Crawl of {} failed: {}",
            result.structure.organization.homepage,
            result
                .errors
                .first()
                .map(|e| e.message.as_str())
                .unwrap_or("unknown error")
        )
    }
}

fn log_summary(result: &CrawlResult) {
    let structure = &result.structure;
    tracing::info!(
        "Crawl finished in {}ms: {} menus, {} boards, {} popups, {} dictionary entries, {} errors",
        result.elapsed_ms,
        structure.navigation.len(),
        structure.boards.len(),
        result.popups.len(),
        result.dictionary.len(),
        result.errors.len()
    );
    tracing::info!(
        "Pages crawled: {} of {} known, max depth {}",
        result.progress.crawled_pages,
        structure.metadata.total_pages,
        structure.metadata.max_depth
    );
}
