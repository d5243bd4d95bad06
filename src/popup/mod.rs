//! Popup and modal detection
//!
//! Finds same-domain pages that ordinary anchor traversal cannot reach:
//!
//! - click handlers (`window.open`, location assignment, popup-ish function calls)
//! - URL-carrying data attributes
//! - `javascript:` anchors with an embedded URL literal
//! - modal triggers pointing at an in-page fragment (`layer`, never fetched)

use crate::html::{self, LINK_SELECTOR};
use crate::navigation::clean_title;
use crate::state::{PopupInfo, TriggerType};
use crate::url::{is_same_domain, resolve_href};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use url::Url;

static WINDOW_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"window\.open\s*\(\s*['"]([^'"]+)['"]"#).expect("valid regex"));

static LOCATION_ASSIGN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:(?:window|document|top|parent|self)\.)?location(?:\.href)?\s*=\s*['"]([^'"]+)['"]"#)
        .expect("valid regex")
});

static POPUP_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)[a-z_$][\w$]*\s*\(\s*['"]([^'"]*(?:popup|pop|detail|view|notice)[^'"]*)['"]"#)
        .expect("valid regex")
});

static URL_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"['"]((?:https?://|/|\./|\.\./)[^'"\s]*|[\w\-]+\.(?:php|html?|asp|aspx|jsp)(?:\?[^'"\s]*)?)['"]"#)
        .expect("valid regex")
});

/// Data attributes known to carry a popup URL
const URL_ATTRIBUTES: [&str; 6] = ["data-url", "data-href", "data-link", "data-popup", "data-popup-url", "data-page"];

/// Elements whose data attributes point at media rather than pages
const MEDIA_ELEMENTS: [&str; 6] = ["img", "iframe", "source", "video", "audio", "picture"];

/// Extensions that never name a popup page
const MEDIA_EXTENSIONS: [&str; 10] = [
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".bmp", ".mp4", ".mp3", ".webm",
];

/// Detects popups in raw HTML
pub fn detect_popups(html: &str, base_url: &Url) -> Vec<PopupInfo> {
    let document = Html::parse_document(html);
    detect_in_document(&document, base_url)
}

/// Detects popups in a parsed document
///
/// Results are deduplicated by absolute URL, first signal wins.
pub fn detect_in_document(document: &Html, base_url: &Url) -> Vec<PopupInfo> {
    let mut found = PopupSet::new(base_url);

    scan_click_handlers(document, &mut found);
    scan_data_attributes(document, &mut found);
    scan_javascript_anchors(document, &mut found);
    scan_modal_triggers(document, &mut found);

    found.popups
}

struct PopupSet<'a> {
    base_url: &'a Url,
    seen: HashSet<String>,
    popups: Vec<PopupInfo>,
}

impl<'a> PopupSet<'a> {
    fn new(base_url: &'a Url) -> Self {
        Self {
            base_url,
            seen: HashSet::new(),
            popups: Vec::new(),
        }
    }

    /// Resolves `raw` against the base URL and records it if it stays on the domain
    fn add(&mut self, raw: &str, element: ElementRef<'_>, trigger_type: TriggerType) -> bool {
        let Some(url) = resolve_href(raw, self.base_url) else {
            return false;
        };
        if !is_same_domain(&url, self.base_url) {
            return false;
        }
        self.push(url, element, trigger_type)
    }

    fn push(&mut self, url: String, element: ElementRef<'_>, trigger_type: TriggerType) -> bool {
        if !self.seen.insert(url.clone()) {
            return false;
        }

        let title = clean_title(&html::element_text(element))
            .or_else(|| element.value().attr("title").and_then(clean_title))
            .unwrap_or_default();

        self.popups.push(PopupInfo {
            url,
            title,
            trigger_type,
            trigger_element: element.value().name().to_string(),
        });
        true
    }
}

fn is_media_path(raw: &str) -> bool {
    let path = raw.split(|c| c == '?' || c == '#').next().unwrap_or(raw).to_ascii_lowercase();
    MEDIA_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn scan_click_handlers(document: &Html, found: &mut PopupSet<'_>) {
    let Some(selector) = html::selector("[onclick]") else {
        return;
    };

    for element in document.select(&selector) {
        let handler = element.value().attr("onclick").unwrap_or("");

        let hit = if let Some(caps) = WINDOW_OPEN.captures(handler) {
            Some((caps[1].to_string(), TriggerType::WindowOpen))
        } else if let Some(caps) = LOCATION_ASSIGN.captures(handler) {
            Some((caps[1].to_string(), TriggerType::Onclick))
        } else {
            POPUP_CALL
                .captures(handler)
                .map(|caps| (caps[1].to_string(), TriggerType::Onclick))
        };

        if let Some((raw, trigger_type)) = hit {
            found.add(&raw, element, trigger_type);
        }
    }
}

fn scan_data_attributes(document: &Html, found: &mut PopupSet<'_>) {
    for attribute in URL_ATTRIBUTES {
        let Some(selector) = html::selector(&format!("[{}]", attribute)) else {
            continue;
        };
        for element in document.select(&selector) {
            if MEDIA_ELEMENTS.contains(&element.value().name()) {
                continue;
            }
            if let Some(raw) = element.value().attr(attribute) {
                if !is_media_path(raw) {
                    found.add(raw, element, TriggerType::DataUrl);
                }
            }
        }
    }
}

fn scan_javascript_anchors(document: &Html, found: &mut PopupSet<'_>) {
    for anchor in document.select(&LINK_SELECTOR) {
        let href = anchor.value().attr("href").unwrap_or("").trim();
        if !href.to_ascii_lowercase().starts_with("javascript:") {
            continue;
        }

        if let Some(caps) = WINDOW_OPEN.captures(href) {
            found.add(&caps[1], anchor, TriggerType::WindowOpen);
        } else if let Some(caps) = URL_LITERAL.captures(href) {
            found.add(&caps[1], anchor, TriggerType::Href);
        }
    }
}

fn scan_modal_triggers(document: &Html, found: &mut PopupSet<'_>) {
    let Some(selector) = html::selector(
        "[data-toggle='modal'], [data-bs-toggle='modal'], a[href^='#'][class*='layer'], \
         a[href^='#'][class*='popup'], a[href^='#'][class*='modal']",
    ) else {
        return;
    };

    for element in document.select(&selector) {
        let value = element.value();
        let target = value
            .attr("data-target")
            .or_else(|| value.attr("data-bs-target"))
            .or_else(|| value.attr("href"))
            .unwrap_or("")
            .trim();

        let Some(id) = target.strip_prefix('#').filter(|id| !id.is_empty()) else {
            continue;
        };

        let mut url = found.base_url.clone();
        url.set_fragment(Some(id));
        found.push(url.to_string(), element, TriggerType::Layer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://church.example/").unwrap()
    }

    #[test]
    fn test_window_open_same_domain() {
        let html = r#"<html><body>
            <a href="javascript:void(0)" onclick="window.open('/notice/1')">공지</a>
        </body></html>"#;
        let popups = detect_popups(html, &base());

        assert_eq!(popups.len(), 1);
        assert_eq!(popups[0].url, "https://church.example/notice/1");
        assert_eq!(popups[0].trigger_type, TriggerType::WindowOpen);
        assert_eq!(popups[0].trigger_element, "a");
        assert_eq!(popups[0].title, "공지");
    }

    #[test]
    fn test_window_open_cross_domain_ignored() {
        let html = r#"<button onclick="window.open('https://other.example/notice/1')">x</button>"#;
        assert!(detect_popups(html, &base()).is_empty());
    }

    #[test]
    fn test_location_assignment_and_generic_call() {
        let html = r#"<html><body>
            <div onclick="location.href='/worship/time'">예배시간</div>
            <span onclick="openPopup('/pop/event.html', 400, 300)">행사</span>
            <span onclick="toggleMenu('main')">menu</span>
        </body></html>"#;
        let popups = detect_popups(html, &base());

        assert_eq!(popups.len(), 2);
        assert_eq!(popups[0].trigger_type, TriggerType::Onclick);
        assert_eq!(popups[0].url, "https://church.example/worship/time");
        assert_eq!(popups[1].url, "https://church.example/pop/event.html");
    }

    #[test]
    fn test_data_attribute() {
        let html = r#"<div data-url="/news/view?id=3">소식</div>"#;
        let popups = detect_popups(html, &base());
        assert_eq!(popups[0].trigger_type, TriggerType::DataUrl);
        assert_eq!(popups[0].url, "https://church.example/news/view?id=3");
    }

    #[test]
    fn test_lazy_loaded_images_are_not_popups() {
        let html = r#"<div class="main-visual">
            <img data-src="/images/slide1.jpg" src="data:image/gif;base64,R0">
            <img data-src="/images/slide2.jpg" src="data:image/gif;base64,R0">
            <div data-url="/images/banner.png">banner</div>
            <div data-popup-url="/popup/event.html">event</div>
        </div>"#;
        let popups = detect_popups(html, &base());

        assert_eq!(popups.len(), 1);
        assert_eq!(popups[0].url, "https://church.example/popup/event.html");
        assert_eq!(popups[0].trigger_element, "div");
    }

    #[test]
    fn test_javascript_anchor_with_literal() {
        let html = r#"<a href="javascript:goPage('/sub/intro.php')">소개</a>"#;
        let popups = detect_popups(html, &base());
        assert_eq!(popups.len(), 1);
        assert_eq!(popups[0].trigger_type, TriggerType::Href);
    }

    #[test]
    fn test_modal_trigger_is_layer() {
        let html = r##"<a href="#layer-notice" class="btn-layer">공지</a>
            <button data-toggle="modal" data-target="#welcome">Welcome</button>"##;
        let popups = detect_popups(html, &base());

        assert_eq!(popups.len(), 2);
        assert!(popups.iter().all(|p| p.trigger_type == TriggerType::Layer));
        assert_eq!(popups[0].url, "https://church.example/#layer-notice");
    }

    #[test]
    fn test_dedup_across_signals() {
        let html = r#"<a href="javascript:window.open('/p/1')" onclick="window.open('/p/1')">x</a>
            <div data-url="/p/1">y</div>"#;
        assert_eq!(detect_popups(html, &base()).len(), 1);
    }
}
