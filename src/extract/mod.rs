//! Entity pattern extractors
//!
//! Pure functions over already fetched HTML. Nothing in here performs I/O or
//! keeps state between calls, so running an extractor twice on the same page
//! yields the same entries.
//!
//! # Components
//!
//! - `contacts`: phone, fax, email, address, postal code
//! - `social`: social media account links
//! - `media`: logo, banners, gallery, video embeds, documents
//! - `worship`: recurring schedule entries
//! - `organization`: departments, districts, small groups and people
//! - `dictionary`: per-crawl dedup of entries and taxonomy derivation

pub mod contacts;
pub mod dictionary;
pub mod media;
pub mod organization;
pub mod social;
pub mod worship;

pub use contacts::extract_contacts;
pub use dictionary::{derive_taxonomy, DictionaryBuilder};
pub use media::extract_media;
pub use organization::{extract_organizations, extract_people};
pub use social::extract_social_links;
pub use worship::extract_worship_times;

use crate::html;
use crate::state::{ContactInfo, DictionaryEntry, MediaAssets, SocialLink, WorshipTime};
use scraper::Html;
use url::Url;

/// Title/URL keywords of pages that list people
const PEOPLE_KEYWORDS: &[&str] = &[
    "섬기는", "교역자", "목회자", "사역자", "담임목사", "직분자", "장로", "staff", "pastor", "people",
    "leader",
];

/// Title/URL keywords of pages that describe the organization's units
const ORGANIZATION_KEYWORDS: &[&str] = &[
    "부서", "교구", "구역", "기관", "조직", "목장", "선교", "교육", "위원회", "department",
    "ministry", "ministries", "organization", "mission",
];

/// Which targeted extraction passes a page deserves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageFocus {
    pub people: bool,
    pub organization: bool,
}

/// Classifies a page by title and URL keywords
pub fn classify_page(url: &str, title: &str) -> PageFocus {
    let haystack = format!("{} {}", url.to_lowercase(), title.to_lowercase());
    PageFocus {
        people: PEOPLE_KEYWORDS.iter().any(|k| haystack.contains(k)),
        organization: ORGANIZATION_KEYWORDS.iter().any(|k| haystack.contains(k)),
    }
}

/// Visible body text of a page
pub fn page_text(document: &Html) -> String {
    html::element_text(html::body(document))
}

/// Generic pattern pass: organization units and people together
pub fn extract_generic(document: &Html, source_url: &str) -> Vec<DictionaryEntry> {
    let text = page_text(document);
    let mut entries = extract_organizations(&text, source_url);
    entries.extend(extract_people(&text, source_url));
    entries
}

/// Extended homepage information
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteDetails {
    pub contacts: Option<ContactInfo>,
    pub social_media: Option<Vec<SocialLink>>,
    pub media: Option<MediaAssets>,
    pub worship_times: Option<Vec<WorshipTime>>,
}

/// Runs the homepage extractors enabled by the toggles
///
/// Contacts, social links and worship times follow `with_contacts`; media
/// follows `with_media`. Empty results are reported as None.
pub fn extract_site_details(html: &str, base_url: &Url, with_contacts: bool, with_media: bool) -> SiteDetails {
    let document = Html::parse_document(html);
    let mut details = SiteDetails::default();

    if with_contacts {
        details.contacts = extract_contacts(&document);
        details.social_media = Some(extract_social_links(&document, base_url)).filter(|links| !links.is_empty());
        details.worship_times = Some(extract_worship_times(&document)).filter(|times| !times.is_empty());
    }

    if with_media {
        details.media = extract_media(&document, base_url);
    }

    details
}
