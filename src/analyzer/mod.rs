//! Structure analyzer collaborator
//!
//! One call per crawl: the homepage HTML (truncated) and an extraction
//! instruction go out, a `{navigation, dictionary, taxonomy, metadata}`
//! object comes back. Any failure here falls back to pattern extraction,
//! so callers log the error and carry on.
//!
//! # Components
//!
//! - `StructureAnalyzer`: the collaborator seam, injected into the crawler
//! - `HttpAnalyzer`: JSON-over-HTTP implementation
//! - `parse_analysis_response`: lenient parsing of the collaborator's answer

mod client;
mod response;

pub use client::HttpAnalyzer;
pub use response::parse_analysis_response;

use crate::html::truncate_chars;
use crate::state::{DictionaryEntry, PageInfo, TaxonomyNode};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Instruction sent along with the homepage HTML
pub const DEFAULT_INSTRUCTIONS: &str = "Analyze this organization homepage. Return a JSON object with \
     the keys navigation (menu tree of {title, url, children}), dictionary (array of {term, category, \
     subcategory, definition}), taxonomy (array of {name, children}) and metadata (free-form object). \
     Categories are person, department, organization, place, event and program.";

/// Errors raised while talking to the structure analyzer
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Analyzer request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Analyzer returned HTTP {0}")]
    Status(u16),

    #[error("Malformed analyzer response: {0}")]
    Malformed(String),
}

/// Result type for analyzer operations
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// What the analyzer is asked to look at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzerRequest {
    pub url: String,
    pub html: String,
    pub instructions: String,
}

impl AnalyzerRequest {
    /// Builds a request, truncating the HTML to `max_html_chars` characters
    pub fn new(url: &str, html: &str, max_html_chars: usize) -> Self {
        Self {
            url: url.to_string(),
            html: truncate_chars(html, max_html_chars).to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }
}

/// The analyzer's answer; missing keys are empty
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisResponse {
    pub navigation: Vec<PageInfo>,
    pub dictionary: Vec<DictionaryEntry>,
    pub taxonomy: Vec<TaxonomyNode>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl AnalysisResponse {
    /// Returns true if the answer carries nothing usable
    pub fn is_empty(&self) -> bool {
        self.navigation.is_empty() && self.dictionary.is_empty() && self.taxonomy.is_empty()
    }
}

/// A collaborator that reads a homepage and proposes its structure
#[async_trait]
pub trait StructureAnalyzer: Send + Sync {
    async fn analyze(&self, request: &AnalyzerRequest) -> AnalyzerResult<AnalysisResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_truncates_html() {
        let html = "가".repeat(50);
        let request = AnalyzerRequest::new("https://church.example/", &html, 10);
        assert_eq!(request.html.chars().count(), 10);
        assert_eq!(request.instructions, DEFAULT_INSTRUCTIONS);
    }

    #[test]
    fn test_empty_response() {
        assert!(AnalysisResponse::default().is_empty());
    }
}
