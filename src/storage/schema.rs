//! Database schema definitions and migrations
//!
//! This module contains all SQL schema definitions for the Steeple database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per crawled organization
CREATE TABLE IF NOT EXISTS organizations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    homepage TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Navigation tree, boards and special pages; parent_id is the tree edge
CREATE TABLE IF NOT EXISTS site_pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    parent_id INTEGER REFERENCES site_pages(id) ON DELETE CASCADE,
    section TEXT NOT NULL,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    page_type TEXT NOT NULL,
    content_type TEXT NOT NULL,
    depth INTEGER NOT NULL,
    sort_order INTEGER NOT NULL,
    crawled INTEGER NOT NULL DEFAULT 0,
    crawl_error TEXT,
    extracted_data TEXT
);

CREATE INDEX IF NOT EXISTS idx_site_pages_org ON site_pages(organization_id);
CREATE INDEX IF NOT EXISTS idx_site_pages_parent ON site_pages(parent_id);

-- Dictionary entries, unique by (term, category) per organization
CREATE TABLE IF NOT EXISTS dictionary_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    term TEXT NOT NULL,
    category TEXT NOT NULL,
    subcategory TEXT,
    definition TEXT,
    aliases TEXT NOT NULL DEFAULT '[]',
    related_terms TEXT NOT NULL DEFAULT '[]',
    metadata TEXT NOT NULL DEFAULT '{}',
    source_url TEXT,
    UNIQUE(organization_id, term, category)
);

CREATE INDEX IF NOT EXISTS idx_dictionary_org ON dictionary_entries(organization_id);

CREATE TABLE IF NOT EXISTS taxonomy_nodes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    parent_id INTEGER REFERENCES taxonomy_nodes(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    sort_order INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_taxonomy_org ON taxonomy_nodes(organization_id);

CREATE TABLE IF NOT EXISTS contacts (
    organization_id INTEGER PRIMARY KEY REFERENCES organizations(id),
    phone TEXT,
    fax TEXT,
    email TEXT,
    address TEXT,
    postal_code TEXT
);

CREATE TABLE IF NOT EXISTS social_media (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    platform TEXT NOT NULL,
    url TEXT NOT NULL
);

-- Logo, banners, gallery images, videos and documents
CREATE TABLE IF NOT EXISTS media_assets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    kind TEXT NOT NULL,
    url TEXT NOT NULL,
    title TEXT,
    platform TEXT,
    extension TEXT,
    sort_order INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS worship_times (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    name TEXT NOT NULL,
    day TEXT,
    time TEXT NOT NULL,
    location TEXT,
    sort_order INTEGER NOT NULL
);

-- One row per saved crawl; kept across replaces
CREATE TABLE IF NOT EXISTS crawl_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    crawled_at TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    success INTEGER NOT NULL,
    pages_crawled INTEGER NOT NULL,
    navigation_count INTEGER NOT NULL,
    board_count INTEGER NOT NULL,
    popup_count INTEGER NOT NULL,
    dictionary_count INTEGER NOT NULL,
    error_count INTEGER NOT NULL,
    error_sample TEXT,
    elapsed_ms INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crawl_logs_org ON crawl_logs(organization_id);
"#;

/// Tables whose rows are replaced wholesale on every save, children first
pub const REPLACED_TABLES: [&str; 3] = ["site_pages", "dictionary_entries", "taxonomy_nodes"];

/// Tables replaced only when the saved result carries that section
pub const EXTENDED_TABLES: [&str; 4] = ["contacts", "social_media", "media_assets", "worship_times"];

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
