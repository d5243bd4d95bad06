//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Sequential HTTP fetching with a fixed inter-request delay
//! - HTML parsing for page metadata, content links and site features
//! - The FIFO frontier with its visited set and page budget
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{CrawlOptions, Crawler, ProgressCallback};
pub use fetcher::{build_http_client, fetch_url, probe_url, FetchResult, FetchedDocument, Fetcher};
pub use frontier::{Admission, Frontier, SkipReason};
pub use parser::{
    classify_content, content_region, detect_site_features, document_extension, extract_boards,
    extract_content_links, extract_metadata, SiteFeatures,
};

use crate::config::Config;
use crate::state::CrawlResult;

/// Runs a complete crawl of the configured organization
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client and the optional structure analyzer
/// 2. Resolve the homepage's effective content root
/// 3. Extract navigation, boards and popups
/// 4. Crawl them breadth-first within the page budget
/// 5. Assemble the `CrawlResult`
///
/// # Example
///
/// ```no_run
/// use steeple::config::load_config;
/// use steeple::crawler::crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("steeple.toml"))?;
/// let result = crawl(&config).await?;
/// println!("{} navigation items", result.structure.navigation.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config) -> crate::Result<CrawlResult> {
    let crawler = Crawler::from_config(config)?;
    Ok(crawler.crawl().await)
}
