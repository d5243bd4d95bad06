//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::{
    ContentType, CrawlResult, DictionaryEntry, EntryCategory, Organization, PageInfo, PageType,
    SiteStructure, TaxonomyNode,
};
use crate::storage::schema::{initialize_schema, EXTENDED_TABLES, REPLACED_TABLES};
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{CrawlLogRecord, OrganizationStats, PageSection, SaveReport};
use crate::CrawlerError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::HashMap;
use std::path::Path;

/// Errors kept in the crawl log's sample
const ERROR_SAMPLE_SIZE: usize = 5;

/// The error sample is cut to this many characters
const MAX_ERROR_SAMPLE_CHARS: usize = 1000;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> Result<Self, CrawlerError> {
        let conn = init_database(path)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, CrawlerError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn organization_row(&self, code: &str) -> StorageResult<Option<(i64, Organization, String)>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, code, homepage, updated_at FROM organizations WHERE code = ?1",
                params![code],
                |row| {
                    Ok((
                        row.get(0)?,
                        Organization {
                            name: row.get(1)?,
                            code: row.get(2)?,
                            homepage: row.get(3)?,
                        },
                        row.get(4)?,
                    ))
                },
            )
            .optional()?;
        Ok(row)
    }

    fn organization_id(&self, code: &str) -> StorageResult<i64> {
        self.organization_row(code)?
            .map(|(id, _, _)| id)
            .ok_or_else(|| StorageError::OrganizationNotFound(code.to_string()))
    }

    fn count(&self, sql: &str, organization_id: i64) -> StorageResult<usize> {
        let count: i64 = self.conn.query_row(sql, params![organization_id], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl Storage for SqliteStorage {
    // ===== Crawl Persistence =====

    fn save_crawl(&mut self, result: &CrawlResult, config_hash: &str) -> StorageResult<SaveReport> {
        let tx = self.conn.transaction()?;
        let organization_id = upsert_organization(&tx, &result.structure.organization)?;

        let structure = &result.structure;
        let present = [
            structure.contacts.is_some(),
            structure.social_media.is_some(),
            structure.media.is_some(),
            structure.worship_times.is_some(),
        ];
        let extended = EXTENDED_TABLES
            .iter()
            .zip(present)
            .filter_map(|(table, present)| present.then_some(table));

        for table in REPLACED_TABLES.iter().chain(extended) {
            tx.execute(
                &format!("DELETE FROM {} WHERE organization_id = ?1", table),
                params![organization_id],
            )?;
        }

        let mut writer = RowWriter {
            tx: &tx,
            organization_id,
            report: SaveReport {
                organization_id,
                ..SaveReport::default()
            },
        };

        writer.insert_pages(&structure.navigation, None, PageSection::Navigation);
        writer.insert_pages(&structure.boards, None, PageSection::Board);
        writer.insert_pages(&structure.special_pages, None, PageSection::Special);
        writer.insert_dictionary(&result.dictionary);
        writer.insert_taxonomy(&result.taxonomy, None);
        writer.insert_extended(structure);
        writer.insert_crawl_log(result, config_hash);

        let report = writer.report;
        tx.commit()?;

        tracing::info!(
            "Saved {} pages, {} dictionary entries, {} taxonomy nodes for {} ({} rows skipped)",
            report.pages,
            report.dictionary_entries,
            report.taxonomy_nodes,
            structure.organization.code,
            report.failed_rows
        );
        Ok(report)
    }

    // ===== Retrieval =====

    fn load_navigation(&self, code: &str) -> StorageResult<Vec<PageInfo>> {
        let organization_id = self.organization_id(code)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, parent_id, url, title, page_type, content_type, depth, crawled,
             crawl_error, extracted_data
             FROM site_pages WHERE organization_id = ?1 AND section = ?2
             ORDER BY id",
        )?;

        let rows = stmt
            .query_map(
                params![organization_id, PageSection::Navigation.to_db_string()],
                |row| {
                    let page_type: String = row.get(4)?;
                    let content_type: String = row.get(5)?;
                    let extracted: Option<String> = row.get(9)?;

                    let mut page = PageInfo::new(
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        PageType::from_db_string(&page_type).unwrap_or(PageType::Content),
                        row.get(6)?,
                    );
                    page.content_type = ContentType::from_db_string(&content_type).unwrap_or_default();
                    page.crawled = row.get(7)?;
                    page.crawl_error = row.get(8)?;
                    page.extracted_data = extracted.and_then(|json| serde_json::from_str(&json).ok());

                    Ok((row.get::<_, i64>(0)?, row.get::<_, Option<i64>>(1)?, page))
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        let mut roots = Vec::new();
        let mut children: HashMap<i64, Vec<(i64, PageInfo)>> = HashMap::new();
        for (id, parent_id, page) in rows {
            match parent_id {
                Some(parent_id) => children.entry(parent_id).or_default().push((id, page)),
                None => roots.push((id, page)),
            }
        }

        Ok(roots
            .into_iter()
            .map(|(id, page)| assemble(id, page, &mut children))
            .collect())
    }

    fn load_dictionary(&self, code: &str) -> StorageResult<Vec<DictionaryEntry>> {
        let organization_id = self.organization_id(code)?;

        let mut stmt = self.conn.prepare(
            "SELECT term, category, subcategory, definition, aliases, related_terms, metadata, source_url
             FROM dictionary_entries WHERE organization_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![organization_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, Option<String>>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut entries = Vec::with_capacity(rows.len());
        for (term, category, subcategory, definition, aliases, related_terms, metadata, source_url) in rows {
            let category = EntryCategory::from_db_string(&category)
                .ok_or_else(|| StorageError::Serialization(format!("Unknown category: {}", category)))?;

            let mut entry = DictionaryEntry::new(term, category);
            entry.subcategory = subcategory;
            entry.definition = definition;
            entry.aliases = serde_json::from_str(&aliases)?;
            entry.related_terms = serde_json::from_str(&related_terms)?;
            entry.metadata = serde_json::from_str(&metadata)?;
            entry.source_url = source_url;
            entries.push(entry);
        }

        Ok(entries)
    }

    // ===== Statistics =====

    fn organization_stats(&self, code: &str) -> StorageResult<Option<OrganizationStats>> {
        let Some((organization_id, organization, updated_at)) = self.organization_row(code)? else {
            return Ok(None);
        };

        let mut sections: HashMap<String, usize> = HashMap::new();
        let mut stmt = self.conn.prepare(
            "SELECT section, COUNT(*) FROM site_pages WHERE organization_id = ?1 GROUP BY section",
        )?;
        let rows = stmt.query_map(params![organization_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (section, count) = row?;
            sections.insert(section, count as usize);
        }
        let section_count = |section: PageSection| sections.get(section.to_db_string()).copied().unwrap_or(0);

        Ok(Some(OrganizationStats {
            navigation_pages: section_count(PageSection::Navigation),
            boards: section_count(PageSection::Board),
            special_pages: section_count(PageSection::Special),
            crawled_pages: self.count(
                "SELECT COUNT(*) FROM site_pages WHERE organization_id = ?1 AND crawled = 1",
                organization_id,
            )?,
            dictionary_entries: self.count(
                "SELECT COUNT(*) FROM dictionary_entries WHERE organization_id = ?1",
                organization_id,
            )?,
            taxonomy_nodes: self.count(
                "SELECT COUNT(*) FROM taxonomy_nodes WHERE organization_id = ?1",
                organization_id,
            )?,
            has_contacts: self.count("SELECT COUNT(*) FROM contacts WHERE organization_id = ?1", organization_id)? > 0,
            social_links: self.count(
                "SELECT COUNT(*) FROM social_media WHERE organization_id = ?1",
                organization_id,
            )?,
            media_assets: self.count(
                "SELECT COUNT(*) FROM media_assets WHERE organization_id = ?1",
                organization_id,
            )?,
            worship_times: self.count(
                "SELECT COUNT(*) FROM worship_times WHERE organization_id = ?1",
                organization_id,
            )?,
            last_crawl: self.latest_crawl_log(code)?,
            organization,
            updated_at,
        }))
    }

    fn latest_crawl_log(&self, code: &str) -> StorageResult<Option<CrawlLogRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT l.id, l.crawled_at, l.config_hash, l.success, l.pages_crawled,
                 l.navigation_count, l.board_count, l.popup_count, l.dictionary_count,
                 l.error_count, l.error_sample, l.elapsed_ms
                 FROM crawl_logs l JOIN organizations o ON o.id = l.organization_id
                 WHERE o.code = ?1 ORDER BY l.id DESC LIMIT 1",
                params![code],
                |row| {
                    Ok(CrawlLogRecord {
                        id: row.get(0)?,
                        crawled_at: row.get(1)?,
                        config_hash: row.get(2)?,
                        success: row.get(3)?,
                        pages_crawled: row.get::<_, i64>(4)? as usize,
                        navigation_count: row.get::<_, i64>(5)? as usize,
                        board_count: row.get::<_, i64>(6)? as usize,
                        popup_count: row.get::<_, i64>(7)? as usize,
                        dictionary_count: row.get::<_, i64>(8)? as usize,
                        error_count: row.get::<_, i64>(9)? as usize,
                        error_sample: row.get(10)?,
                        elapsed_ms: row.get::<_, i64>(11)? as u64,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }
}

fn upsert_organization(tx: &Transaction<'_>, organization: &Organization) -> StorageResult<i64> {
    tx.execute(
        "INSERT INTO organizations (code, name, homepage, updated_at) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(code) DO UPDATE SET name = excluded.name, homepage = excluded.homepage,
         updated_at = excluded.updated_at",
        params![
            organization.code,
            organization.name,
            organization.homepage,
            Utc::now().to_rfc3339()
        ],
    )?;
    let id = tx.query_row(
        "SELECT id FROM organizations WHERE code = ?1",
        params![organization.code],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Rebuilds one stored subtree, restoring the parent back-references
fn assemble(id: i64, mut page: PageInfo, children: &mut HashMap<i64, Vec<(i64, PageInfo)>>) -> PageInfo {
    let parent_url = page.has_url().then(|| page.url.clone());
    page.children = children
        .remove(&id)
        .unwrap_or_default()
        .into_iter()
        .map(|(child_id, mut child)| {
            child.parent_url = parent_url.clone();
            assemble(child_id, child, children)
        })
        .collect();
    page
}

fn subtree_size(page: &PageInfo) -> usize {
    1 + page.children.iter().map(subtree_size).sum::<usize>()
}

/// Inserts the rows of one save, skipping and counting rows that fail
struct RowWriter<'a, 'conn> {
    tx: &'a Transaction<'conn>,
    organization_id: i64,
    report: SaveReport,
}

impl RowWriter<'_, '_> {
    fn skipped(&mut self, what: &str, rows: usize, error: &rusqlite::Error) {
        tracing::warn!("Skipping {} ({} rows): {}", what, rows, error);
        self.report.failed_rows += rows;
    }

    /// Depth-first, with each page's sibling position as its sort order
    fn insert_pages(&mut self, pages: &[PageInfo], parent_id: Option<i64>, section: PageSection) {
        for (order, page) in pages.iter().enumerate() {
            match self.insert_page(page, parent_id, section, order) {
                Ok(id) => {
                    self.report.pages += 1;
                    self.insert_pages(&page.children, Some(id), section);
                }
                Err(e) => self.skipped(&format!("page {}", page.url), subtree_size(page), &e),
            }
        }
    }

    fn insert_page(
        &self,
        page: &PageInfo,
        parent_id: Option<i64>,
        section: PageSection,
        order: usize,
    ) -> rusqlite::Result<i64> {
        let extracted = page
            .extracted_data
            .as_ref()
            .and_then(|data| serde_json::to_string(data).ok());

        self.tx.execute(
            "INSERT INTO site_pages (organization_id, parent_id, section, url, title, page_type,
             content_type, depth, sort_order, crawled, crawl_error, extracted_data)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                self.organization_id,
                parent_id,
                section.to_db_string(),
                page.url,
                page.title,
                page.page_type.to_db_string(),
                page.content_type.to_db_string(),
                page.depth,
                order as i64,
                page.crawled,
                page.crawl_error,
                extracted
            ],
        )?;
        Ok(self.tx.last_insert_rowid())
    }

    fn insert_dictionary(&mut self, entries: &[DictionaryEntry]) {
        for entry in entries {
            let outcome = self.tx.execute(
                "INSERT INTO dictionary_entries (organization_id, term, category, subcategory,
                 definition, aliases, related_terms, metadata, source_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    self.organization_id,
                    entry.term,
                    entry.category.to_db_string(),
                    entry.subcategory,
                    entry.definition,
                    serde_json::Value::from(entry.aliases.clone()).to_string(),
                    serde_json::Value::from(entry.related_terms.clone()).to_string(),
                    serde_json::Value::Object(entry.metadata.clone()).to_string(),
                    entry.source_url
                ],
            );
            match outcome {
                Ok(_) => self.report.dictionary_entries += 1,
                Err(e) => self.skipped(&format!("dictionary entry {}", entry.term), 1, &e),
            }
        }
    }

    fn insert_taxonomy(&mut self, nodes: &[TaxonomyNode], parent_id: Option<i64>) {
        for (order, node) in nodes.iter().enumerate() {
            let outcome = self
                .tx
                .execute(
                    "INSERT INTO taxonomy_nodes (organization_id, parent_id, name, sort_order)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![self.organization_id, parent_id, node.name, order as i64],
                )
                .map(|_| self.tx.last_insert_rowid());

            match outcome {
                Ok(id) => {
                    self.report.taxonomy_nodes += 1;
                    self.insert_taxonomy(&node.children, Some(id));
                }
                Err(e) => self.skipped(&format!("taxonomy node {}", node.name), 1, &e),
            }
        }
    }

    fn insert_extended(&mut self, structure: &SiteStructure) {
        if let Some(contacts) = &structure.contacts {
            let outcome = self.tx.execute(
                "INSERT INTO contacts (organization_id, phone, fax, email, address, postal_code)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    self.organization_id,
                    contacts.phone,
                    contacts.fax,
                    contacts.email,
                    contacts.address,
                    contacts.postal_code
                ],
            );
            self.extended("contacts", outcome);
        }

        for link in structure.social_media.iter().flatten() {
            let outcome = self.tx.execute(
                "INSERT INTO social_media (organization_id, platform, url) VALUES (?1, ?2, ?3)",
                params![self.organization_id, link.platform, link.url],
            );
            self.extended("social link", outcome);
        }

        if let Some(media) = &structure.media {
            let mut assets: Vec<(&str, &str, Option<&str>, Option<&str>, Option<&str>)> = Vec::new();
            if let Some(logo) = &media.logo {
                assets.push(("logo", logo.as_str(), None, None, None));
            }
            assets.extend(media.banners.iter().map(|url| ("banner", url.as_str(), None, None, None)));
            assets.extend(media.gallery.iter().map(|url| ("gallery", url.as_str(), None, None, None)));
            assets.extend(
                media
                    .videos
                    .iter()
                    .map(|video| ("video", video.url.as_str(), None, Some(video.platform.as_str()), None)),
            );
            assets.extend(media.documents.iter().map(|document| {
                (
                    "document",
                    document.url.as_str(),
                    Some(document.title.as_str()),
                    None,
                    Some(document.extension.as_str()),
                )
            }));

            for (order, (kind, url, title, platform, extension)) in assets.into_iter().enumerate() {
                let outcome = self.tx.execute(
                    "INSERT INTO media_assets (organization_id, kind, url, title, platform, extension, sort_order)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![self.organization_id, kind, url, title, platform, extension, order as i64],
                );
                self.extended("media asset", outcome);
            }
        }

        for (order, time) in structure.worship_times.iter().flatten().enumerate() {
            let outcome = self.tx.execute(
                "INSERT INTO worship_times (organization_id, name, day, time, location, sort_order)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![self.organization_id, time.name, time.day, time.time, time.location, order as i64],
            );
            self.extended("worship time", outcome);
        }
    }

    fn extended(&mut self, what: &str, outcome: rusqlite::Result<usize>) {
        match outcome {
            Ok(_) => self.report.extended_rows += 1,
            Err(e) => self.skipped(what, 1, &e),
        }
    }

    fn insert_crawl_log(&mut self, result: &CrawlResult, config_hash: &str) {
        let mut navigation_count = 0;
        for page in &result.structure.navigation {
            page.walk(&mut |_| navigation_count += 1);
        }

        let error_sample = (!result.errors.is_empty()).then(|| {
            let sample = result
                .errors
                .iter()
                .take(ERROR_SAMPLE_SIZE)
                .map(|e| format!("{}: {}", e.url, e.message))
                .collect::<Vec<_>>()
                .join("; ");
            sample.chars().take(MAX_ERROR_SAMPLE_CHARS).collect::<String>()
        });

        let outcome = self.tx.execute(
            "INSERT INTO crawl_logs (organization_id, crawled_at, config_hash, success, pages_crawled,
             navigation_count, board_count, popup_count, dictionary_count, error_count, error_sample,
             elapsed_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                self.organization_id,
                Utc::now().to_rfc3339(),
                config_hash,
                result.success,
                result.progress.crawled_pages as i64,
                navigation_count as i64,
                result.structure.boards.len() as i64,
                result.popups.len() as i64,
                result.dictionary.len() as i64,
                result.errors.len() as i64,
                error_sample,
                result.elapsed_ms as i64
            ],
        );
        if let Err(e) = outcome {
            self.skipped("crawl log", 1, &e);
        }
    }
}

/// Initializes or opens a database at the given path
pub fn init_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
    ",
    )?;

    initialize_schema(&conn)?;

    Ok(conn)
}
