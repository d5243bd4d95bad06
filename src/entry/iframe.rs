use crate::html;
use crate::url::resolve_href;
use scraper::Html;
use url::Url;

/// Bodies with less visible text than this are a shell around a frame
const SHELL_TEXT_CHARS: usize = 100;

/// Returns the `src` of the frame a thin shell page wraps, if any
///
/// Frames named or identified as main/content are preferred over the first one.
pub fn detect(html: &str, base_url: &Url) -> Option<String> {
    let document = Html::parse_document(html);

    if html::element_text(html::body(&document)).chars().count() >= SHELL_TEXT_CHARS {
        return None;
    }

    let frames = html::selector("iframe[src], frame[src]")?;
    let current = resolve_href(base_url.as_str(), base_url);

    let candidates: Vec<(String, bool)> = document
        .select(&frames)
        .filter_map(|frame| {
            let src = frame.value().attr("src")?;
            if src.trim().eq_ignore_ascii_case("about:blank") {
                return None;
            }
            let target = resolve_href(src, base_url)?;
            if current.as_deref() == Some(target.as_str()) {
                return None;
            }
            let naming = format!(
                "{} {}",
                frame.value().attr("name").unwrap_or(""),
                html::class_and_id(frame)
            )
            .to_lowercase();
            Some((target, naming.contains("main") || naming.contains("content")))
        })
        .collect();

    candidates
        .iter()
        .find(|(_, preferred)| *preferred)
        .or_else(|| candidates.first())
        .map(|(target, _)| target.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://church.example/").unwrap()
    }

    #[test]
    fn test_full_page_iframe() {
        let html = r#"<html><body style="margin:0"><iframe src="/home/main.html" width="100%" height="100%"></iframe></body></html>"#;
        assert_eq!(
            detect(html, &base()),
            Some("https://church.example/home/main.html".to_string())
        );
    }

    #[test]
    fn test_frameset_prefers_main_frame() {
        let html = r#"<html><frameset rows="80,*">
            <frame name="top" src="/top.html">
            <frame name="mainFrame" src="/main.html">
        </frameset></html>"#;
        assert_eq!(
            detect(html, &base()),
            Some("https://church.example/main.html".to_string())
        );
    }

    #[test]
    fn test_content_page_with_embedded_video_is_not_shell() {
        let text = "주일 오전 11시 예배에 여러분을 초대합니다. ".repeat(10);
        let html = format!(
            r#"<html><body><p>{}</p><iframe src="https://www.youtube.com/embed/abc"></iframe></body></html>"#,
            text
        );
        assert_eq!(detect(&html, &base()), None);
    }
}
