//! Crawl output records
//!
//! A `SiteStructure` is built fresh for every crawl and fully replaces the
//! organization's previously stored structure.

use crate::state::page::{ContentType, CrawlErrorKind, EntryCategory, PageType, TriggerType};
use serde::{Deserialize, Serialize};

/// Identity of the organization being crawled
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub name: String,
    pub code: String,
    pub homepage: String,
}

/// Metadata captured from a successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub favicon: Option<String>,
    pub charset: Option<String>,
    pub viewport: Option<String>,
}

/// A page in the discovered structure
///
/// `url` is empty for navigation group headers that only open a submenu.
/// `parent_url` is a back-reference only; ownership flows through `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub url: String,
    pub title: String,
    pub page_type: PageType,
    pub depth: u32,
    pub parent_url: Option<String>,
    #[serde(default)]
    pub children: Vec<PageInfo>,
    #[serde(default)]
    pub content_type: ContentType,
    pub extracted_data: Option<PageMetadata>,
    #[serde(default)]
    pub crawled: bool,
    pub crawl_error: Option<String>,
}

impl PageInfo {
    /// Creates an uncrawled page with no parent and no children
    pub fn new(url: impl Into<String>, title: impl Into<String>, page_type: PageType, depth: u32) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            page_type,
            depth,
            parent_url: None,
            children: Vec::new(),
            content_type: ContentType::Static,
            extracted_data: None,
            crawled: false,
            crawl_error: None,
        }
    }

    pub fn with_children(mut self, children: Vec<PageInfo>) -> Self {
        self.children = children;
        self
    }

    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Returns true if the node carries a URL that can be fetched
    pub fn has_url(&self) -> bool {
        !self.url.is_empty()
    }

    /// Visits this node and all of its descendants in depth-first order
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a PageInfo)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// A page reachable only through a non-standard trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupInfo {
    pub url: String,
    pub title: String,
    pub trigger_type: TriggerType,
    pub trigger_element: String,
}

impl PopupInfo {
    /// Renders the popup as a depth-0 special page
    pub fn to_page_info(&self) -> PageInfo {
        let page_type = match self.trigger_type {
            TriggerType::Layer => PageType::Modal,
            _ => PageType::Popup,
        };
        PageInfo::new(&self.url, &self.title, page_type, 0).with_content_type(ContentType::Popup)
    }
}

/// A normalized domain term extracted from page content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub term: String,
    pub category: EntryCategory,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub related_terms: Vec<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl DictionaryEntry {
    pub fn new(term: impl Into<String>, category: EntryCategory) -> Self {
        Self {
            term: term.into(),
            category,
            subcategory: None,
            definition: None,
            aliases: Vec::new(),
            related_terms: Vec::new(),
            metadata: serde_json::Map::new(),
            source_url: None,
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_source(mut self, source_url: impl Into<String>) -> Self {
        self.source_url = Some(source_url.into());
        self
    }
}

/// A named node of the taxonomy tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyNode {
    pub name: String,
    #[serde(default)]
    pub children: Vec<TaxonomyNode>,
}

/// Organization contact details
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.phone.is_none()
            && self.fax.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.postal_code.is_none()
    }
}

/// A link to one of the organization's social media accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

/// An embedded video player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEmbed {
    pub platform: String,
    pub url: String,
}

/// A downloadable document linked from the site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLink {
    pub title: String,
    pub url: String,
    pub extension: String,
}

/// Media assets found on the homepage
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAssets {
    pub logo: Option<String>,
    pub banners: Vec<String>,
    pub gallery: Vec<String>,
    pub videos: Vec<VideoEmbed>,
    pub documents: Vec<DocumentLink>,
}

impl MediaAssets {
    pub fn is_empty(&self) -> bool {
        self.logo.is_none()
            && self.banners.is_empty()
            && self.gallery.is_empty()
            && self.videos.is_empty()
            && self.documents.is_empty()
    }
}

/// A recurring schedule entry such as a weekly service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorshipTime {
    pub name: String,
    pub day: Option<String>,
    pub time: String,
    pub location: Option<String>,
}

/// Site-wide facts gathered during the crawl
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMetadata {
    pub total_pages: usize,
    pub max_depth: u32,
    pub has_login: bool,
    pub has_mobile_version: bool,
    pub technologies: Vec<String>,
}

/// Root aggregate describing one organization's website
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStructure {
    pub organization: Organization,
    pub navigation: Vec<PageInfo>,
    pub boards: Vec<PageInfo>,
    pub special_pages: Vec<PageInfo>,
    pub metadata: SiteMetadata,
    pub contacts: Option<ContactInfo>,
    pub social_media: Option<Vec<SocialLink>>,
    pub media: Option<MediaAssets>,
    pub worship_times: Option<Vec<WorshipTime>>,
}

impl SiteStructure {
    /// Visits every page of the navigation tree, boards and special pages
    pub fn walk_pages<'a>(&'a self, visit: &mut dyn FnMut(&'a PageInfo)) {
        for page in self.navigation.iter().chain(&self.boards).chain(&self.special_pages) {
            page.walk(visit);
        }
    }
}

/// An error recorded during a crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlError {
    pub url: String,
    pub kind: CrawlErrorKind,
    pub message: String,
}

impl CrawlError {
    pub fn new(url: impl Into<String>, kind: CrawlErrorKind, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind,
            message: message.into(),
        }
    }
}

/// Snapshot emitted for every visited page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlProgress {
    pub total_pages: usize,
    pub crawled_pages: usize,
    pub current_url: String,
    pub current_depth: u32,
    pub errors: Vec<CrawlError>,
}

/// Counts of the extended (non-structural) information found
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedInfo {
    pub has_contacts: bool,
    pub social_links: usize,
    pub has_logo: bool,
    pub banners: usize,
    pub gallery_images: usize,
    pub videos: usize,
    pub documents: usize,
    pub worship_times: usize,
}

impl ExtendedInfo {
    pub fn from_structure(structure: &SiteStructure) -> Self {
        let media = structure.media.as_ref();
        Self {
            has_contacts: structure.contacts.is_some(),
            social_links: structure.social_media.as_ref().map_or(0, Vec::len),
            has_logo: media.is_some_and(|m| m.logo.is_some()),
            banners: media.map_or(0, |m| m.banners.len()),
            gallery_images: media.map_or(0, |m| m.gallery.len()),
            videos: media.map_or(0, |m| m.videos.len()),
            documents: media.map_or(0, |m| m.documents.len()),
            worship_times: structure.worship_times.as_ref().map_or(0, Vec::len),
        }
    }
}

/// Everything one crawl produced
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    pub success: bool,
    pub structure: SiteStructure,
    pub dictionary: Vec<DictionaryEntry>,
    pub taxonomy: Vec<TaxonomyNode>,
    pub popups: Vec<PopupInfo>,
    pub errors: Vec<CrawlError>,
    pub elapsed_ms: u64,
    pub progress: CrawlProgress,
    pub extended: ExtendedInfo,
}

impl CrawlResult {
    /// Builds the result for a crawl that could not start
    pub fn failed(organization: Organization, error: CrawlError, elapsed_ms: u64) -> Self {
        let progress = CrawlProgress {
            current_url: error.url.clone(),
            errors: vec![error.clone()],
            ..CrawlProgress::default()
        };
        Self {
            success: false,
            structure: SiteStructure {
                organization,
                ..SiteStructure::default()
            },
            errors: vec![error],
            elapsed_ms,
            progress,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_info_serializes_camel_case() {
        let page = PageInfo::new("https://church.example/about", "About", PageType::Menu, 1);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pageType"], "menu");
        assert_eq!(json["contentType"], "static");
        assert_eq!(json["crawled"], false);
        assert!(json.get("parentUrl").is_some());
    }

    #[test]
    fn test_walk_visits_descendants_in_order() {
        let tree = PageInfo::new("a", "A", PageType::Menu, 1).with_children(vec![
            PageInfo::new("b", "B", PageType::Submenu, 2),
            PageInfo::new("c", "C", PageType::Submenu, 2),
        ]);
        let mut seen = Vec::new();
        tree.walk(&mut |page| seen.push(page.url.as_str()));
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_layer_popup_renders_as_modal() {
        let popup = PopupInfo {
            url: "https://church.example/#layer".to_string(),
            title: "Notice".to_string(),
            trigger_type: TriggerType::Layer,
            trigger_element: "a".to_string(),
        };
        let page = popup.to_page_info();
        assert_eq!(page.page_type, PageType::Modal);
        assert_eq!(page.depth, 0);
        assert_eq!(page.content_type, ContentType::Popup);
    }

    #[test]
    fn test_dictionary_entry_defaults_when_deserializing() {
        let entry: DictionaryEntry =
            serde_json::from_str(r#"{"term": "청년부", "category": "department"}"#).unwrap();
        assert_eq!(entry.term, "청년부");
        assert!(entry.aliases.is_empty());
        assert!(entry.subcategory.is_none());
    }

    #[test]
    fn test_failed_result_has_single_error() {
        let error = CrawlError::new(
            "https://church.example/",
            CrawlErrorKind::HomepageUnreachable,
            "HTTP 500",
        );
        let result = CrawlResult::failed(Organization::default(), error, 12);
        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert!(result.structure.navigation.is_empty());
    }
}
