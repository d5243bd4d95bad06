//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::{CrawlResult, DictionaryEntry, PageInfo};
use crate::storage::{CrawlLogRecord, OrganizationStats, SaveReport};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Organization not found: {0}")]
    OrganizationNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// A saved crawl fully replaces the organization's previously stored
/// structure; there is no incremental merge.
pub trait Storage {
    // ===== Crawl Persistence =====

    /// Replaces the organization's stored structure with a crawl result
    ///
    /// The replace runs in one transaction. A failure while deleting the old
    /// rows or at commit rolls everything back and is returned as `Err`.
    /// Individual row insert failures are logged, skipped and counted in the
    /// returned report.
    ///
    /// # Arguments
    ///
    /// * `result` - The crawl result to store
    /// * `config_hash` - Hash of the configuration file, recorded in the crawl log
    fn save_crawl(&mut self, result: &CrawlResult, config_hash: &str) -> StorageResult<SaveReport>;

    // ===== Retrieval =====

    /// Rebuilds the stored navigation tree in sibling order
    fn load_navigation(&self, code: &str) -> StorageResult<Vec<PageInfo>>;

    /// Loads the stored dictionary in insertion order
    fn load_dictionary(&self, code: &str) -> StorageResult<Vec<DictionaryEntry>>;

    // ===== Statistics =====

    /// Row counts for an organization, None if it was never saved
    fn organization_stats(&self, code: &str) -> StorageResult<Option<OrganizationStats>>;

    /// Most recent crawl log row for an organization
    fn latest_crawl_log(&self, code: &str) -> StorageResult<Option<CrawlLogRecord>>;
}
