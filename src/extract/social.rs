use crate::html::{self, LINK_SELECTOR};
use crate::state::SocialLink;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use url::Url;

/// Platform name and the hosts its account pages live on
const PLATFORMS: [(&str, &[&str]); 8] = [
    ("facebook", &["facebook.com", "fb.com", "fb.me"]),
    ("instagram", &["instagram.com"]),
    ("youtube", &["youtube.com", "youtu.be"]),
    ("twitter", &["twitter.com", "x.com"]),
    ("naver_blog", &["blog.naver.com", "m.blog.naver.com"]),
    ("naver_cafe", &["cafe.naver.com", "m.cafe.naver.com"]),
    ("kakao", &["pf.kakao.com", "story.kakao.com", "open.kakao.com", "ch.kakao.com"]),
    ("tiktok", &["tiktok.com"]),
];

/// Icon class/alt fragments for links whose href does not name the platform
const ICON_HINTS: [(&str, &[&str]); 3] = [
    ("facebook", &["facebook", "fb"]),
    ("instagram", &["instagram", "insta"]),
    ("youtube", &["youtube", "ytb"]),
];

/// Finds links to the organization's social media accounts
pub fn extract_social_links(document: &Html, base_url: &Url) -> Vec<SocialLink> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in document.select(&LINK_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(url) = base_url.join(href.trim()) else {
            continue;
        };
        if url.scheme() != "http" && url.scheme() != "https" {
            continue;
        }

        let platform = platform_for_url(&url).or_else(|| platform_for_icon(anchor));
        if let Some(platform) = platform {
            let url = url.to_string();
            if seen.insert(url.clone()) {
                links.push(SocialLink {
                    platform: platform.to_string(),
                    url,
                });
            }
        }
    }

    links
}

/// Matches the URL host against the platform table
///
/// Video pages are embeds or individual posts, not accounts.
fn platform_for_url(url: &Url) -> Option<&'static str> {
    let host = url.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let path = url.path();
    if path.starts_with("/embed") || path.starts_with("/watch") {
        return None;
    }

    PLATFORMS.iter().find_map(|(platform, hosts)| {
        hosts
            .iter()
            .any(|h| host == *h || host.ends_with(&format!(".{}", h)))
            .then_some(*platform)
    })
}

fn platform_for_icon(anchor: ElementRef<'_>) -> Option<&'static str> {
    let mut hints = html::class_and_id(anchor);
    for child in anchor.descendants().filter_map(ElementRef::wrap) {
        let value = child.value();
        hints.push(' ');
        hints.push_str(&html::class_and_id(child));
        for attribute in ["alt", "src", "title"] {
            if let Some(text) = value.attr(attribute) {
                hints.push(' ');
                hints.push_str(&text.to_lowercase());
            }
        }
    }
    if let Some(title) = anchor.value().attr("title") {
        hints.push(' ');
        hints.push_str(&title.to_lowercase());
    }

    ICON_HINTS.iter().find_map(|(platform, needles)| {
        needles
            .iter()
            .any(|needle| hints.contains(needle))
            .then_some(*platform)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://church.example/").unwrap()
    }

    fn platforms(html: &str) -> Vec<String> {
        extract_social_links(&Html::parse_document(html), &base())
            .into_iter()
            .map(|l| l.platform)
            .collect()
    }

    #[test]
    fn test_platform_table() {
        let html = r#"<html><body>
            <a href="https://www.facebook.com/church">f</a>
            <a href="https://www.instagram.com/church/">i</a>
            <a href="https://www.youtube.com/@church">y</a>
            <a href="https://blog.naver.com/church">b</a>
            <a href="https://cafe.naver.com/church">c</a>
            <a href="https://pf.kakao.com/_abc">k</a>
            <a href="https://x.com/church">x</a>
            <a href="https://www.tiktok.com/@church">t</a>
        </body></html>"#;
        assert_eq!(
            platforms(html),
            vec!["facebook", "instagram", "youtube", "naver_blog", "naver_cafe", "kakao", "twitter", "tiktok"]
        );
    }

    #[test]
    fn test_icon_fallback() {
        let html = r#"<a href="/go.php?sns=1"><i class="xi-instagram"></i></a>
            <a href="/go.php?sns=2"><img src="/img/ico_youtube.png" alt=""></a>"#;
        assert_eq!(platforms(html), vec!["instagram", "youtube"]);
    }

    #[test]
    fn test_ignores_video_pages_and_duplicates() {
        let html = r#"<a href="https://www.youtube.com/watch?v=abc">sermon</a>
            <a href="https://www.facebook.com/church">f</a>
            <a href="https://www.facebook.com/church">f again</a>"#;
        assert_eq!(platforms(html), vec!["facebook"]);
    }
}
