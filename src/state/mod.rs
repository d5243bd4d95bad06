//! State module for the crawl data model
//!
//! # Components
//!
//! - `page`: enumerations (page type, content type, popup trigger, entry category, error kind)
//! - `site`: the records that make up a `CrawlResult`
//! - `arena`: the flat URL-keyed page store the crawl engine builds the tree in

mod arena;
mod page;
mod site;

// Re-export main types
pub use arena::{PageArena, PageId};
pub use page::{ContentType, CrawlErrorKind, EntryCategory, PageType, TriggerType};
pub use site::{
    ContactInfo, CrawlError, CrawlProgress, CrawlResult, DictionaryEntry, DocumentLink,
    ExtendedInfo, MediaAssets, Organization, PageInfo, PageMetadata, PopupInfo, SiteMetadata,
    SiteStructure, SocialLink, TaxonomyNode, VideoEmbed, WorshipTime,
};
