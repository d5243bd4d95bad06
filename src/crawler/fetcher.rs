//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with the fixed user agent string
//! - GET requests to fetch page content
//! - HEAD probes used by XML menu discovery
//! - Error classification
//!
//! Nothing here retries. A failed fetch is reported once and the caller
//! decides whether it is fatal.

use crate::config::UserAgentConfig;
use reqwest::{redirect::Policy, Client};
use std::time::{Duration, Instant};

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Response body is not a text document
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Converts the result into the fetched document or a one-line error message
    pub fn into_document(self) -> Result<FetchedDocument, String> {
        match self {
            Self::Success {
                final_url, body, ..
            } => Ok(FetchedDocument { final_url, body }),
            Self::ContentMismatch { content_type } => {
                Err(format!("Expected a text document, got {}", content_type))
            }
            Self::HttpError { status_code } => Err(format!("HTTP {}", status_code)),
            Self::NetworkError { error } => Err(error),
        }
    }
}

/// A successfully fetched text document
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Final URL after HTTP redirects
    pub final_url: String,
    pub body: String,
}

/// Sequential HTTP access with a fixed delay between requests
///
/// The crawl has exactly one request in flight at a time; the delay is its
/// only back-pressure. Every request made during a crawl, including entry
/// refetches and HEAD probes, goes through one `Fetcher`.
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    delay: Duration,
    last_request: Option<Instant>,
    requests: usize,
}

impl Fetcher {
    pub fn new(client: Client, delay_ms: u64) -> Self {
        Self {
            client,
            delay: Duration::from_millis(delay_ms),
            last_request: None,
            requests: 0,
        }
    }

    /// GETs a URL after waiting out the inter-request delay
    pub async fn fetch(&mut self, url: &str) -> FetchResult {
        self.wait_turn().await;
        tracing::debug!("GET {}", url);
        fetch_url(&self.client, url).await
    }

    /// HEADs a URL after waiting out the inter-request delay
    pub async fn probe(&mut self, url: &str) -> bool {
        self.wait_turn().await;
        probe_url(&self.client, url).await
    }

    /// Number of requests sent so far
    pub fn requests(&self) -> usize {
        self.requests
    }

    async fn wait_turn(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
        self.requests += 1;
    }
}

/// Builds an HTTP client with proper configuration
///
/// All requests are anonymous GET/HEAD requests carrying the configured
/// user agent. HTTP redirects are followed by reqwest (max 10 hops);
/// HTML-level redirects are the entry resolution chain's job.
///
/// # Example
///
/// ```no_run
/// use steeple::config::UserAgentConfig;
/// use steeple::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "Steeple".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, 30).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with a text Content-Type | `Success` |
/// | 2xx with a binary Content-Type | `ContentMismatch` |
/// | any other status | `HttpError` |
/// | timeout / connect failure / body read failure | `NetworkError` |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_network_error(&e),
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_text_content_type(&content_type) {
        return FetchResult::ContentMismatch { content_type };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}

/// Sends a HEAD request and reports whether the resource exists
pub async fn probe_url(client: &Client, url: &str) -> bool {
    match client.head(url).send().await {
        Ok(response) => response.status().is_success(),
        Err(e) => {
            tracing::trace!("HEAD {} failed: {}", url, e);
            false
        }
    }
}

fn classify_network_error(e: &reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    };
    FetchResult::NetworkError { error }
}

/// HTML, XML and other text bodies are accepted; a missing header is too
fn is_text_content_type(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.starts_with("text/")
        || content_type.contains("html")
        || content_type.contains("xml")
}
