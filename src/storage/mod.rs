//! Storage module for persisting crawl results
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Full replacement of an organization's stored structure per crawl
//! - Crawl log rows summarizing each saved crawl
//! - Statistics queries for stored organizations

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{init_database, SqliteStorage};
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::Organization;
use crate::CrawlerError;

use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, CrawlerError> {
    SqliteStorage::new(path)
}

/// Which part of the site structure a stored page belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSection {
    Navigation,
    Board,
    Special,
}

impl PageSection {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Navigation => "navigation",
            Self::Board => "board",
            Self::Special => "special",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "navigation" => Some(Self::Navigation),
            "board" => Some(Self::Board),
            "special" => Some(Self::Special),
            _ => None,
        }
    }
}

/// What one `save_crawl` wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub organization_id: i64,
    pub pages: usize,
    pub dictionary_entries: usize,
    pub taxonomy_nodes: usize,
    /// Contacts, social media, media asset and worship time rows
    pub extended_rows: usize,
    /// Rows skipped because their insert failed (a failed page also skips its subtree)
    pub failed_rows: usize,
}

/// Represents a crawl log row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlLogRecord {
    pub id: i64,
    pub crawled_at: String,
    pub config_hash: String,
    pub success: bool,
    pub pages_crawled: usize,
    pub navigation_count: usize,
    pub board_count: usize,
    pub popup_count: usize,
    pub dictionary_count: usize,
    pub error_count: usize,
    pub error_sample: Option<String>,
    pub elapsed_ms: u64,
}

/// Stored row counts for one organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationStats {
    pub organization: Organization,
    pub updated_at: String,
    pub navigation_pages: usize,
    pub boards: usize,
    pub special_pages: usize,
    pub crawled_pages: usize,
    pub dictionary_entries: usize,
    pub taxonomy_nodes: usize,
    pub has_contacts: bool,
    pub social_links: usize,
    pub media_assets: usize,
    pub worship_times: usize,
    pub last_crawl: Option<CrawlLogRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_section_roundtrip() {
        for section in &[PageSection::Navigation, PageSection::Board, PageSection::Special] {
            let db_str = section.to_db_string();
            assert_eq!(Some(*section), PageSection::from_db_string(db_str));
        }
    }

    #[test]
    fn test_page_section_invalid() {
        assert_eq!(PageSection::from_db_string("invalid"), None);
    }
}
