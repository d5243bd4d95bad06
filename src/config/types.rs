use serde::Deserialize;

/// Main configuration structure for Steeple
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub organization: OrganizationConfig,
    #[serde(default)]
    pub analyzer: Option<AnalyzerConfig>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Deepest level that is still fetched (inclusive, menu roots are depth 1)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Page budget shared by the navigation and popup phases
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Fixed delay between two fetches (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Follow links beyond the navigation tree
    #[serde(rename = "deep-crawl")]
    pub deep_crawl: bool,

    /// Run the contact, social media and worship time extractors
    #[serde(rename = "extract-contacts")]
    pub extract_contacts: bool,

    /// Run the media extractor
    #[serde(rename = "extract-media")]
    pub extract_media: bool,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_pages: 100,
            delay_ms: 500,
            deep_crawl: true,
            extract_contacts: true,
            extract_media: true,
            request_timeout_secs: 30,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown crawl report
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

/// The organization whose website is crawled
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationConfig {
    pub name: String,

    /// Stable key the stored structure is filed under
    pub code: String,

    pub homepage: String,
}

/// Structure analyzer endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    pub endpoint: String,

    /// Homepage HTML is truncated to this many characters before it is sent
    #[serde(rename = "max-html-chars", default = "default_max_html_chars")]
    pub max_html_chars: usize,

    #[serde(rename = "timeout-secs", default = "default_analyzer_timeout")]
    pub timeout_secs: u64,
}

fn default_max_html_chars() -> usize {
    30_000
}

fn default_analyzer_timeout() -> u64 {
    60
}
