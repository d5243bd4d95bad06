use crate::html::META_SELECTOR;
use crate::url::resolve_href;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use url::Url;

static REFRESH_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)url\s*=\s*['"]?([^'";]+)"#).expect("valid regex"));

/// Returns the target of a `<meta http-equiv="refresh">` tag, if any
///
/// A refresh back to the same URL is not a redirect.
pub fn detect(html: &str, base_url: &Url) -> Option<String> {
    let document = Html::parse_document(html);

    let content = document
        .select(&META_SELECTOR)
        .filter(|meta| {
            meta.value()
                .attr("http-equiv")
                .is_some_and(|h| h.trim().eq_ignore_ascii_case("refresh"))
        })
        .find_map(|meta| meta.value().attr("content"))?;

    let raw = REFRESH_TARGET.captures(content)?.get(1)?.as_str().trim();
    let target = resolve_href(raw, base_url)?;
    let current = resolve_href(base_url.as_str(), base_url);

    (current.as_deref() != Some(target.as_str())).then_some(target)
}
