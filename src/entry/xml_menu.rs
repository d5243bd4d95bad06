//! Menus served as a `depth1/depth2/depth3` XML document
//!
//! Flash-era and some builder templates render the menu from an XML file
//! that a script loads at runtime. The file is parsed with the HTML parser
//! after rewriting the XML-only constructs it would otherwise mangle
//! (self-closing elements, CDATA sections, `<link>` which HTML treats as void).

use crate::html::{self, SCRIPT_SELECTOR};
use crate::navigation::NavCollector;
use crate::state::PageInfo;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Conventional locations probed with HEAD when no script names the file
pub const CANDIDATE_PATHS: [&str; 4] = ["/menu.xml", "/xml/menu.xml", "/data/menu.xml", "/common/xml/menu.xml"];

const TITLE_KEYS: [&str; 5] = ["name", "title", "text", "label", "menuname"];
const URL_KEYS: [&str; 4] = ["url", "link", "href", "menu-link"];

static SCRIPT_XML_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)['"]([^'"\s]*menu[^'"\s]*\.xml(?:\?[^'"\s]*)?)['"]"#).expect("valid regex")
});

static SELF_CLOSING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([A-Za-z][\w:-]*)((?:\s[^>]*?)?)\s*/>").expect("valid regex"));

static CDATA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("valid regex"));

static LINK_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(/?)link(\s|>)").expect("valid regex"));

static LEVELS: Lazy<[Selector; 3]> = Lazy::new(|| {
    ["depth1", "depth2", "depth3"].map(|name| Selector::parse(name).expect("valid level selector"))
});

/// Finds a menu XML path referenced from inline or external script tags
pub fn find_script_reference(html: &str, base_url: &Url) -> Option<String> {
    let document = Html::parse_document(html);

    document.select(&SCRIPT_SELECTOR).find_map(|script| {
        let text = script.text().collect::<String>();
        let raw = SCRIPT_XML_PATH
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())?;
        base_url.join(&raw).ok().map(String::from)
    })
}

/// Absolute URLs of the conventional menu locations
pub fn candidate_urls(base_url: &Url) -> Vec<String> {
    CANDIDATE_PATHS
        .iter()
        .filter_map(|path| base_url.join(path).ok())
        .map(String::from)
        .collect()
}

/// Parses a menu XML document into navigation items (depths 1 to 3)
pub fn parse_menu(xml: &str, base_url: &Url) -> Vec<PageInfo> {
    let prepared = prepare(xml);
    let document = Html::parse_fragment(&prepared);
    let mut collector = NavCollector::new(base_url);

    let mut roots = Vec::new();
    for element in document.select(&LEVELS[0]) {
        if let Some(item) = read_level(element, 0, &mut collector) {
            roots.push(item);
        }
    }
    roots
}

fn read_level(element: ElementRef<'_>, level: usize, collector: &mut NavCollector<'_>) -> Option<PageInfo> {
    let title = value_of(element, &TITLE_KEYS)?;
    let url = value_of(element, &URL_KEYS);
    let depth = level as u32 + 1;

    let mut page = collector.accept(url.as_deref(), &title, depth)?;

    if let Some(next) = LEVELS.get(level + 1) {
        page.children = element
            .select(next)
            .filter(|child| nearest_level_parent(*child, level).is_some_and(|p| p.id() == element.id()))
            .filter_map(|child| read_level(child, level + 1, collector))
            .collect();
    }

    Some(page)
}

/// The closest ancestor at `level`, so that a level-3 node is not read twice
fn nearest_level_parent(element: ElementRef<'_>, level: usize) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| LEVELS[level].matches(ancestor))
}

/// Reads a value from an attribute or a direct child element, then decodes it
fn value_of(element: ElementRef<'_>, keys: &[&str]) -> Option<String> {
    let from_attribute = keys.iter().find_map(|key| element.value().attr(key));
    let raw = match from_attribute {
        Some(value) => value.to_string(),
        None => html::child_elements(element)
            .find(|child| keys.contains(&child.value().name()))
            .map(|child| child.text().collect::<String>())?,
    };

    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(raw)
        .map(|value| value.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    Some(decoded)
}

/// Rewrites XML-only syntax into markup the HTML parser keeps intact
fn prepare(xml: &str) -> String {
    let without_cdata = CDATA.replace_all(xml, "$1");
    let renamed = LINK_TAG.replace_all(&without_cdata, "<${1}menu-link$2");
    SELF_CLOSING
        .replace_all(&renamed, "<$1$2></$1>")
        .into_owned()
}
