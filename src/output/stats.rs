//! Statistics display from the crawl database
//!
//! This module provides functionality for loading and displaying the stored
//! row counts of an organization.

use crate::storage::{OrganizationStats, Storage, StorageError};
use crate::CrawlerError;

/// Loads statistics for an organization from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `code` - Organization code
///
/// # Returns
///
/// * `Ok(OrganizationStats)` - Successfully loaded statistics
/// * `Err(CrawlerError)` - The organization was never saved or the query failed
pub fn load_statistics(storage: &dyn Storage, code: &str) -> Result<OrganizationStats, CrawlerError> {
    storage
        .organization_stats(code)?
        .ok_or_else(|| StorageError::OrganizationNotFound(code.to_string()).into())
}

/// Formats statistics as the text printed by `--stats`
pub fn format_statistics(stats: &OrganizationStats) -> String {
    let mut out = String::new();

    out.push_str("=== Steeple Statistics ===\n\n");

    out.push_str(&format!(
        "Organization: {} ({})\n",
        stats.organization.name, stats.organization.code
    ));
    out.push_str(&format!("  Homepage: {}\n", stats.organization.homepage));
    out.push_str(&format!("  Updated: {}\n\n", stats.updated_at));

    out.push_str("Structure:\n");
    out.push_str(&format!("  Navigation pages: {}\n", stats.navigation_pages));
    out.push_str(&format!("  Boards: {}\n", stats.boards));
    out.push_str(&format!("  Special pages: {}\n", stats.special_pages));

    let total = stats.navigation_pages + stats.boards + stats.special_pages;
    let crawled_rate = if total > 0 {
        (stats.crawled_pages as f64 / total as f64) * 100.0
    } else {
        0.0
    };
    out.push_str(&format!(
        "  Crawled: {} / {} ({:.1}%)\n\n",
        stats.crawled_pages, total, crawled_rate
    ));

    out.push_str("Extracted:\n");
    out.push_str(&format!("  Dictionary entries: {}\n", stats.dictionary_entries));
    out.push_str(&format!("  Taxonomy nodes: {}\n", stats.taxonomy_nodes));
    out.push_str(&format!(
        "  Contacts: {}\n",
        if stats.has_contacts { "yes" } else { "no" }
    ));
    out.push_str(&format!("  Social links: {}\n", stats.social_links));
    out.push_str(&format!("  Media assets: {}\n", stats.media_assets));
    out.push_str(&format!("  Worship times: {}\n", stats.worship_times));

    if let Some(log) = &stats.last_crawl {
        out.push_str("\nLast Crawl:\n");
        out.push_str(&format!("  At: {}\n", log.crawled_at));
        out.push_str(&format!(
            "  Status: {}\n",
            if log.success { "success" } else { "failed" }
        ));
        out.push_str(&format!("  Pages crawled: {}\n", log.pages_crawled));
        out.push_str(&format!(
            "  Navigation / boards / popups: {} / {} / {}\n",
            log.navigation_count, log.board_count, log.popup_count
        ));
        out.push_str(&format!("  Errors: {}\n", log.error_count));
        if let Some(sample) = &log.error_sample {
            out.push_str(&format!("  Error sample: {}\n", sample));
        }
        out.push_str(&format!("  Elapsed: {} ms\n", log.elapsed_ms));
        out.push_str(&format!("  Config hash: {}\n", log.config_hash));
    }

    out
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &OrganizationStats) {
    print!("{}", format_statistics(stats));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Organization;
    use crate::storage::{CrawlLogRecord, SqliteStorage};

    fn create_test_stats() -> OrganizationStats {
        OrganizationStats {
            organization: Organization {
                name: "Test Church".to_string(),
                code: "test".to_string(),
                homepage: "https://church.example/".to_string(),
            },
            updated_at: "2026-01-01T00:00:00+00:00".to_string(),
            navigation_pages: 8,
            boards: 1,
            special_pages: 1,
            crawled_pages: 5,
            dictionary_entries: 12,
            taxonomy_nodes: 4,
            has_contacts: true,
            social_links: 2,
            media_assets: 3,
            worship_times: 0,
            last_crawl: Some(CrawlLogRecord {
                id: 1,
                crawled_at: "2026-01-01T00:00:00+00:00".to_string(),
                config_hash: "abc123".to_string(),
                success: true,
                pages_crawled: 5,
                navigation_count: 8,
                board_count: 1,
                popup_count: 1,
                dictionary_count: 12,
                error_count: 0,
                error_sample: None,
                elapsed_ms: 4200,
            }),
        }
    }

    #[test]
    fn test_format_statistics() {
        let text = format_statistics(&create_test_stats());

        assert!(text.contains("Organization: Test Church (test)"));
        assert!(text.contains("Crawled: 5 / 10 (50.0%)"));
        assert!(text.contains("Contacts: yes"));
        assert!(text.contains("Config hash: abc123"));
        assert!(!text.contains("Error sample"));
    }

    #[test]
    fn test_load_statistics_for_unknown_organization() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let result = load_statistics(&storage, "missing");
        assert!(matches!(
            result,
            Err(CrawlerError::Storage(StorageError::OrganizationNotFound(_)))
        ));
    }
}
