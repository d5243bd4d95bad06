use crate::html::{self, LINK_SELECTOR, NAV_CONTAINERS};
use crate::url::{is_same_domain, resolve_href};
use scraper::Html;
use url::Url;

/// Anchor text, href, class or id fragments that lead past an intro page
const ENTER_PATTERNS: &[&str] = &[
    "skip", "enter", "입장", "바로가기", "메인", "건너뛰기", "main", "index", "home",
];

const INTRO_BLOCKS: &str = "video, #intro, .intro, #intro_video, .intro-video, .intro_wrap, \
     #skip_intro, .btn-skip, [class*='intro']";

/// Bodies with less visible text than this count as near-empty
const NEAR_EMPTY_TEXT_CHARS: usize = 200;

/// Near-empty bodies with more links than this are real pages
const MAX_INTRO_LINKS: usize = 5;

/// Returns the "enter site" target of an intro landing page, if this is one
pub fn detect(html: &str, base_url: &Url) -> Option<String> {
    let document = Html::parse_document(html);

    if html::select_first(&document, NAV_CONTAINERS).is_some() {
        return None;
    }

    let body = html::body(&document);
    let links: Vec<_> = body.select(&LINK_SELECTOR).collect();
    let has_intro_block = html::select_first(&document, INTRO_BLOCKS).is_some();
    let near_empty = html::element_text(body).chars().count() < NEAR_EMPTY_TEXT_CHARS
        && links.len() <= MAX_INTRO_LINKS;

    if !has_intro_block && !near_empty {
        return None;
    }

    let current = resolve_href(base_url.as_str(), base_url);

    links.into_iter().find_map(|anchor| {
        let href = anchor.value().attr("href")?;
        let haystack = format!(
            "{} {} {}",
            html::element_text(anchor),
            href,
            html::class_and_id(anchor)
        )
        .to_lowercase();

        if !ENTER_PATTERNS.iter().any(|p| haystack.contains(p)) {
            return None;
        }

        let target = resolve_href(href, base_url)?;
        (is_same_domain(&target, base_url) && current.as_deref() != Some(target.as_str()))
            .then_some(target)
    })
}
