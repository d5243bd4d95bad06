//! HTML parser for page metadata and crawlable links
//!
//! This module handles parsing fetched pages to extract:
//! - Page metadata (title, description, social preview tags, favicon, charset, viewport)
//! - Links to follow from the page's content region
//! - Content-type classification of a page
//! - Site-level facts from the homepage (login, mobile version, technology tags, boards)

use crate::html::{self, LINK_SELECTOR, META_SELECTOR, SCRIPT_SELECTOR, TITLE_SELECTOR};
use crate::state::{ContentType, PageInfo, PageMetadata, PageType};
use crate::url::{is_same_domain, resolve_href};
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use url::Url;

/// Regions tried in order when looking for a page's main content
const CONTENT_REGIONS: &[&str] = &[
    "#content",
    "#contents",
    "#sub_content",
    ".sub_content",
    "#container",
    "main",
    "article",
    ".content",
    ".contents",
];

/// Links to these file types are documents, not pages
const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "hwp", "hwpx", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "zip", "jpg", "jpeg",
    "png", "gif", "mp3", "mp4",
];

/// URL fragments that mark a bulletin board
const BOARD_PATTERNS: &[&str] = &["board", "bbs", "bo_table=", "notice", "gallery"];

/// Site-level facts detected on the homepage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteFeatures {
    pub has_login: bool,
    pub has_mobile_version: bool,
    pub technologies: Vec<String>,
}

/// Extracts page metadata from a parsed document
pub fn extract_metadata(document: &Html, base_url: &Url) -> PageMetadata {
    let mut metadata = PageMetadata {
        title: extract_title(document),
        ..PageMetadata::default()
    };

    for meta in document.select(&META_SELECTOR) {
        let value = meta.value();
        let key = value
            .attr("name")
            .or_else(|| value.attr("property"))
            .map(str::to_ascii_lowercase);
        let content = value.attr("content").map(html::clean_text).filter(|c| !c.is_empty());

        if let Some(charset) = value.attr("charset") {
            metadata.charset.get_or_insert_with(|| charset.trim().to_lowercase());
        }

        if value
            .attr("http-equiv")
            .is_some_and(|h| h.eq_ignore_ascii_case("content-type"))
        {
            if let Some(charset) = content.as_deref().and_then(charset_from_content_type) {
                metadata.charset.get_or_insert(charset);
            }
        }

        let (Some(key), Some(content)) = (key, content) else {
            continue;
        };
        let slot = match key.as_str() {
            "description" => &mut metadata.description,
            "og:title" => &mut metadata.og_title,
            "og:description" => &mut metadata.og_description,
            "og:image" => &mut metadata.og_image,
            "viewport" => &mut metadata.viewport,
            _ => continue,
        };
        slot.get_or_insert(content);
    }

    metadata.favicon = extract_favicon(document, base_url);
    metadata
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| html::clean_text(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

fn extract_favicon(document: &Html, base_url: &Url) -> Option<String> {
    let selector = html::selector("link[rel][href]")?;
    document
        .select(&selector)
        .find(|link| {
            link.value()
                .attr("rel")
                .is_some_and(|rel| rel.to_ascii_lowercase().split_whitespace().any(|r| r == "icon"))
        })
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| base_url.join(href.trim()).ok())
        .map(String::from)
}

fn charset_from_content_type(content: &str) -> Option<String> {
    let lowered = content.to_ascii_lowercase();
    let (_, charset) = lowered.split_once("charset=")?;
    let charset = charset.trim().trim_matches(|c| c == '"' || c == '\'');
    (!charset.is_empty()).then(|| charset.to_string())
}

/// Finds the element holding the page's main content
pub fn content_region(document: &Html) -> ElementRef<'_> {
    CONTENT_REGIONS
        .iter()
        .filter_map(|css| html::select_first(document, css))
        .find(|region| region.select(&LINK_SELECTOR).next().is_some())
        .unwrap_or_else(|| html::body(document))
}

/// Extracts same-domain page links from the content region
///
/// # Link Extraction Rules
///
/// **Include:** `<a href>` inside the first matching content region (or the
/// whole body when none matches) that resolves to the base URL's host.
///
/// **Exclude:** `javascript:`, `mailto:`, `tel:`, fragment-only and data
/// hrefs, `download` anchors, document/media file links, and duplicates.
pub fn extract_content_links(document: &Html, base_url: &Url) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in content_region(document).select(&LINK_SELECTOR) {
        if anchor.value().attr("download").is_some() {
            continue;
        }

        let Some(url) = anchor
            .value()
            .attr("href")
            .and_then(|href| resolve_href(href, base_url))
        else {
            continue;
        };

        if !is_same_domain(&url, base_url) || is_document_url(&url) {
            continue;
        }

        if seen.insert(url.clone()) {
            links.push((url, html::element_text(anchor)));
        }
    }

    links
}

/// Returns the lowercase file extension if the URL points to a document
pub fn document_extension(url: &str) -> Option<String> {
    let path = Url::parse(url).ok()?.path().to_lowercase();
    let (_, extension) = path.rsplit_once('.')?;
    DOCUMENT_EXTENSIONS
        .contains(&extension)
        .then(|| extension.to_string())
}

fn is_document_url(url: &str) -> bool {
    document_extension(url).is_some()
}

/// Classifies a page by URL and title keywords
pub fn classify_content(url: &str, title: &str) -> ContentType {
    let haystack = format!("{} {}", url.to_lowercase(), title.to_lowercase());
    let has = |needles: &[&str]| needles.iter().any(|n| haystack.contains(n));

    if has(&["gallery", "photo", "album", "앨범", "사진", "갤러리"]) {
        ContentType::Gallery
    } else if has(&["video", "movie", "vod", "sermon", "설교", "영상", "youtube"]) {
        ContentType::Video
    } else if has(&["board", "bbs", "bo_table", "notice", "게시판", "공지", "소식"]) {
        ContentType::Board
    } else if has(&["write", "apply", "form", "신청", "문의"]) {
        ContentType::Form
    } else if has(&["list", "목록"]) {
        ContentType::List
    } else {
        ContentType::Static
    }
}

/// Detects login, mobile site and technology markers on the homepage
pub fn detect_site_features(document: &Html, base_url: &Url) -> SiteFeatures {
    let mut features = SiteFeatures::default();

    for anchor in document.select(&LINK_SELECTOR) {
        let href = anchor.value().attr("href").unwrap_or("").to_lowercase();
        let text = html::element_text(anchor).to_lowercase();

        if href.contains("login") || text.contains("login") || text.contains("로그인") {
            features.has_login = true;
        }

        if let Some(url) = resolve_href(&href, base_url).and_then(|u| Url::parse(&u).ok()) {
            let mobile_host = url.host_str().is_some_and(|h| h.starts_with("m."));
            if mobile_host || url.path() == "/m" || url.path().starts_with("/m/") {
                features.has_mobile_version = true;
            }
        }
    }

    if let Some(password) = html::selector("input[type='password']") {
        features.has_login |= document.select(&password).next().is_some();
    }

    let mut sources: Vec<String> = document
        .select(&SCRIPT_SELECTOR)
        .filter_map(|s| s.value().attr("src"))
        .map(str::to_lowercase)
        .collect();
    if let Some(styles) = html::selector("link[rel='stylesheet'][href]") {
        sources.extend(
            document
                .select(&styles)
                .filter_map(|l| l.value().attr("href"))
                .map(str::to_lowercase),
        );
    }
    if let Some(generator) = html::select_first(document, "meta[name='generator']") {
        sources.push(generator.value().attr("content").unwrap_or("").to_lowercase());
    }
    let markup_hints = document.root_element().html().to_lowercase();

    let mut technologies = Vec::new();
    for (tag, needles) in TECHNOLOGY_MARKERS {
        let in_sources = sources.iter().any(|s| needles.iter().any(|n| s.contains(n)));
        let in_markup = *tag == "gnuboard" && markup_hints.contains("bo_table=");
        if in_sources || in_markup {
            technologies.push(tag.to_string());
        }
    }
    technologies.sort();
    technologies.dedup();
    features.technologies = technologies;

    features
}

const TECHNOLOGY_MARKERS: &[(&str, &[&str])] = &[
    ("jquery", &["jquery"]),
    ("bootstrap", &["bootstrap"]),
    ("wordpress", &["wp-content", "wp-includes", "wordpress"]),
    ("gnuboard", &["gnuboard", "/g5/", "g5_"]),
    ("xe", &["xe.min.js", "/xe/", "rhymix", "xpressengine"]),
    ("react", &["react"]),
    ("vue", &["vue"]),
    ("swiper", &["swiper"]),
    ("slick", &["slick"]),
];

/// Finds bulletin board links on the homepage that the navigation tree missed
pub fn extract_boards(document: &Html, base_url: &Url, known: &HashSet<String>) -> Vec<PageInfo> {
    let mut seen = HashSet::new();
    let mut boards = Vec::new();

    for anchor in document.select(&LINK_SELECTOR) {
        let Some(url) = anchor
            .value()
            .attr("href")
            .and_then(|href| resolve_href(href, base_url))
        else {
            continue;
        };

        let lowered = url.to_lowercase();
        if !BOARD_PATTERNS.iter().any(|p| lowered.contains(p))
            || !is_same_domain(&url, base_url)
            || known.contains(&url)
            || !seen.insert(url.clone())
        {
            continue;
        }

        let title = html::element_text(anchor);
        let title = if title.is_empty() || title.chars().count() > 100 {
            url.clone()
        } else {
            title
        };
        let content_type = classify_content(&url, &title);
        boards.push(PageInfo::new(url, title, PageType::Board, 0).with_content_type(content_type));
    }

    boards
}
