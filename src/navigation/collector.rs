//! Per-pass item collection for the navigation strategies

use crate::crawler::classify_content;
use crate::html;
use crate::state::{PageInfo, PageType};
use crate::url::{is_same_domain, resolve_href};
use scraper::ElementRef;
use std::collections::HashSet;
use url::Url;

/// Titles longer than this are body text, not menu labels
pub const MAX_TITLE_CHARS: usize = 100;

/// Deepest navigation level any strategy produces
pub const MAX_NAV_DEPTH: u32 = 3;

/// Builds `PageInfo` nodes for one strategy pass
///
/// Deduplicates by absolute URL within the pass, rejects empty and
/// over-length titles, and drops links that leave the base URL's host.
/// Top-level items whose href cannot be navigated keep an empty URL so
/// that they can still act as group headers.
#[derive(Debug)]
pub struct NavCollector<'a> {
    base_url: &'a Url,
    seen: HashSet<String>,
}

impl<'a> NavCollector<'a> {
    pub fn new(base_url: &'a Url) -> Self {
        Self {
            base_url,
            seen: HashSet::new(),
        }
    }

    /// Creates a collector that treats the given URLs as already taken
    pub fn with_seen(base_url: &'a Url, seen: impl IntoIterator<Item = String>) -> Self {
        Self {
            base_url,
            seen: seen.into_iter().collect(),
        }
    }

    pub fn base_url(&self) -> &Url {
        self.base_url
    }

    /// Accepts an item from a raw href and label
    pub fn accept(&mut self, href: Option<&str>, label: &str, depth: u32) -> Option<PageInfo> {
        let title = clean_title(label)?;

        let url = match href.and_then(|h| resolve_href(h, self.base_url)) {
            Some(url) => {
                if !is_same_domain(&url, self.base_url) || !self.seen.insert(url.clone()) {
                    return None;
                }
                url
            }
            None if depth <= 1 => String::new(),
            None => return None,
        };

        let content_type = classify_content(&url, &title);
        Some(
            PageInfo::new(url, title, PageType::for_menu_depth(depth), depth)
                .with_content_type(content_type),
        )
    }

    /// Accepts an item from an anchor (or any labelled element)
    pub fn accept_element(&mut self, element: ElementRef<'_>, depth: u32) -> Option<PageInfo> {
        let href = element.value().attr("href");
        self.accept(href, &element_label(element), depth)
    }
}

/// Trims and collapses a label, rejecting empty and over-length titles
pub fn clean_title(raw: &str) -> Option<String> {
    let title = html::clean_text(raw);
    if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
        None
    } else {
        Some(title)
    }
}

/// Visible label of an element, falling back to `title` and image `alt` text
pub fn element_label(element: ElementRef<'_>) -> String {
    let text = html::element_text(element);
    if !text.is_empty() {
        return text;
    }

    if let Some(title) = element.value().attr("title") {
        return title.to_string();
    }

    html::selector("img[alt]")
        .and_then(|img| {
            element
                .select(&img)
                .next()
                .and_then(|i| i.value().attr("alt"))
                .map(str::to_string)
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://church.example/").unwrap()
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("  교회   소개 \n"), Some("교회 소개".to_string()));
        assert_eq!(clean_title("   "), None);
        assert_eq!(clean_title(&"x".repeat(101)), None);
        assert!(clean_title(&"x".repeat(100)).is_some());
    }

    #[test]
    fn test_accept_dedups_within_pass() {
        let base = base();
        let mut collector = NavCollector::new(&base);
        assert!(collector.accept(Some("/about"), "About", 1).is_some());
        assert!(collector.accept(Some("/about/"), "About again", 1).is_none());
    }

    #[test]
    fn test_accept_drops_cross_domain() {
        let base = base();
        let mut collector = NavCollector::new(&base);
        assert!(collector.accept(Some("https://other.example/"), "Other", 1).is_none());
    }

    #[test]
    fn test_group_header_keeps_empty_url_only_at_top() {
        let base = base();
        let mut collector = NavCollector::new(&base);

        let header = collector.accept(Some("#"), "Ministries", 1).unwrap();
        assert!(header.url.is_empty());
        assert_eq!(header.page_type, PageType::Menu);

        assert!(collector.accept(Some("javascript:void(0)"), "Sub", 2).is_none());
    }

    #[test]
    fn test_accept_assigns_page_type_by_depth() {
        let base = base();
        let mut collector = NavCollector::new(&base);
        let item = collector.accept(Some("/about/history"), "History", 2).unwrap();
        assert_eq!(item.page_type, PageType::Submenu);
        assert_eq!(item.depth, 2);
        assert_eq!(item.url, "https://church.example/about/history");
    }
}
