//! Shared selectors and DOM helpers

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

/// Selector for anchor elements with hrefs.
pub(crate) static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid link selector"));

/// Selector for `<body>` elements.
pub(crate) static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("valid body selector"));

/// Selector for `<title>` tags.
pub(crate) static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("valid title selector"));

/// Selector for `<meta>` tags.
pub(crate) static META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta").expect("valid meta selector"));

/// Selector for inline and external scripts.
pub(crate) static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("valid script selector"));

/// Containers that hold a site's primary navigation
pub(crate) const NAV_CONTAINERS: &str = "nav, #gnb, .gnb, #nav, .nav, #menu, .menu, \
     #topmenu, .topmenu, #main-menu, .main-menu, .navigation, [role='navigation']";

/// Parses a selector that is built at runtime, yielding None on invalid input
pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Returns the first element matching any of the comma-separated selectors
pub(crate) fn select_first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = selector(css)?;
    doc.select(&selector).next()
}

/// Returns the document body, falling back to the root element
pub(crate) fn body(doc: &Html) -> ElementRef<'_> {
    doc.select(&BODY_SELECTOR)
        .next()
        .unwrap_or_else(|| doc.root_element())
}

/// Collapses runs of whitespace into single spaces and trims
pub(crate) fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of an element, with script and style content skipped
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .is_some_and(|el| matches!(el.name(), "script" | "style" | "noscript"));
        if !hidden {
            parts.push(text.to_string());
        }
    }
    clean_text(&parts.join(" "))
}

/// Direct element children of `element`
pub(crate) fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// Direct element children with the given tag name
pub(crate) fn children_named<'a>(
    element: ElementRef<'a>,
    name: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    child_elements(element).filter(move |child| child.value().name() == name)
}

/// Lowercased `class` and `id` attributes joined, for keyword containment checks
pub(crate) fn class_and_id(element: ElementRef<'_>) -> String {
    let value = element.value();
    format!(
        "{} {}",
        value.attr("class").unwrap_or(""),
        value.attr("id").unwrap_or("")
    )
    .to_lowercase()
}

/// Returns true if the element or one of its ancestors has the given tag name
pub(crate) fn has_ancestor_named(element: ElementRef<'_>, names: &[&str]) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| names.contains(&ancestor.value().name()))
}

/// Truncates to at most `max_chars` characters without splitting a code point
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
