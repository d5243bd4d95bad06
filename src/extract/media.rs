use crate::html::{self, LINK_SELECTOR};
use crate::state::{DocumentLink, MediaAssets, VideoEmbed};
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use url::Url;

const LOGO_SELECTORS: [&str; 6] = [
    ".logo img",
    "#logo img",
    "header h1 img",
    ".navbar-brand img",
    "img[class*='logo']",
    "img[src*='logo']",
];

const BANNER_IMAGES: &str = ".main-visual img, .mainVisual img, .main_visual img, #visual img, \
     .visual img, .banner img, [class*='banner'] img, .swiper-slide img, .slick-slide img, \
     .carousel-item img, .slide img";

const GALLERY_IMAGES: &str = ".gallery img, [class*='gallery'] img, [class*='album'] img, \
     .photo img, [class*='photo'] img, .thumb img";

const VIDEO_HOSTS: [(&str, &[&str]); 4] = [
    ("youtube", &["youtube.com", "youtube-nocookie.com", "youtu.be"]),
    ("vimeo", &["vimeo.com"]),
    ("naver_tv", &["tv.naver.com"]),
    ("kakao_tv", &["tv.kakao.com", "play-tv.kakao.com"]),
];

const DOCUMENT_EXTENSIONS: [&str; 10] = ["pdf", "hwp", "hwpx", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "zip"];

const MAX_BANNERS: usize = 20;
const MAX_GALLERY_IMAGES: usize = 50;

/// Collects logo, banners, gallery images, embedded videos and document links
pub fn extract_media(document: &Html, base_url: &Url) -> Option<MediaAssets> {
    let logo = LOGO_SELECTORS.iter().find_map(|css| {
        let selector = html::selector(css)?;
        document
            .select(&selector)
            .find_map(|img| image_url(img, base_url))
    });

    let mut seen: HashSet<String> = logo.iter().cloned().collect();
    let banners = collect_images(document, BANNER_IMAGES, base_url, &mut seen, MAX_BANNERS);
    let gallery = collect_images(document, GALLERY_IMAGES, base_url, &mut seen, MAX_GALLERY_IMAGES);

    let media = MediaAssets {
        logo,
        banners,
        gallery,
        videos: extract_videos(document, base_url),
        documents: extract_documents(document, base_url),
    };

    (!media.is_empty()).then_some(media)
}

fn collect_images(
    document: &Html,
    css: &str,
    base_url: &Url,
    seen: &mut HashSet<String>,
    limit: usize,
) -> Vec<String> {
    let Some(selector) = html::selector(css) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|img| image_url(img, base_url))
        .filter(|url| seen.insert(url.clone()))
        .take(limit)
        .collect()
}

/// Absolute image URL, honoring lazy-loading attributes
fn image_url(img: ElementRef<'_>, base_url: &Url) -> Option<String> {
    let value = img.value();
    let src = value
        .attr("data-src")
        .or_else(|| value.attr("data-original"))
        .or_else(|| value.attr("src"))?
        .trim();

    if src.is_empty() || src.starts_with("data:") {
        return None;
    }
    base_url.join(src).ok().map(String::from)
}

fn extract_videos(document: &Html, base_url: &Url) -> Vec<VideoEmbed> {
    let Some(frames) = html::selector("iframe") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut videos = Vec::new();

    for frame in document.select(&frames) {
        let value = frame.value();
        let Some(src) = value.attr("src").or_else(|| value.attr("data-src")) else {
            continue;
        };
        let Ok(url) = base_url.join(src.trim()) else {
            continue;
        };
        let Some(host) = url.host_str().map(str::to_lowercase) else {
            continue;
        };

        let platform = VIDEO_HOSTS.iter().find_map(|(platform, hosts)| {
            hosts
                .iter()
                .any(|h| host == *h || host.ends_with(&format!(".{}", h)))
                .then_some(*platform)
        });

        if let Some(platform) = platform {
            if seen.insert(url.to_string()) {
                videos.push(VideoEmbed {
                    platform: platform.to_string(),
                    url: url.to_string(),
                });
            }
        }
    }

    videos
}

fn extract_documents(document: &Html, base_url: &Url) -> Vec<DocumentLink> {
    let mut seen = HashSet::new();
    let mut documents = Vec::new();

    for anchor in document.select(&LINK_SELECTOR) {
        let Some(url) = anchor
            .value()
            .attr("href")
            .and_then(|href| base_url.join(href.trim()).ok())
        else {
            continue;
        };

        let path = url.path().to_lowercase();
        let Some(extension) = path
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| DOCUMENT_EXTENSIONS.contains(ext))
        else {
            continue;
        };

        if !seen.insert(url.to_string()) {
            continue;
        }

        let title = html::element_text(anchor);
        let title = if title.is_empty() {
            path.rsplit('/').next().unwrap_or("").to_string()
        } else {
            title
        };

        documents.push(DocumentLink {
            title,
            url: url.to_string(),
            extension: extension.to_string(),
        });
    }

    documents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://church.example/").unwrap()
    }

    fn media(html: &str) -> MediaAssets {
        extract_media(&Html::parse_document(html), &base()).unwrap_or_default()
    }

    #[test]
    fn test_logo_first_matching_selector() {
        let assets = media(
            r#"<html><body><header><h1><a href="/"><img src="/img/top_logo.png"></a></h1></header>
            <div class="logo"><img src="/img/logo.png"></div></body></html>"#,
        );
        assert_eq!(assets.logo.as_deref(), Some("https://church.example/img/logo.png"));
    }

    #[test]
    fn test_banners_deduplicated_and_lazy_src() {
        let assets = media(
            r#"<div class="main-visual">
                <div class="swiper-slide"><img data-src="/img/b1.jpg" src="data:image/gif;base64,R0"></div>
                <div class="swiper-slide"><img src="/img/b2.jpg"></div>
                <div class="swiper-slide"><img src="/img/b1.jpg"></div>
            </div>"#,
        );
        assert_eq!(
            assets.banners,
            vec!["https://church.example/img/b1.jpg", "https://church.example/img/b2.jpg"]
        );
    }

    #[test]
    fn test_videos_and_documents() {
        let assets = media(
            r#"<iframe src="https://www.youtube.com/embed/abc"></iframe>
            <iframe src="https://maps.example/embed"></iframe>
            <a href="/files/weekly.HWP">주보</a>
            <a href="/files/report.pdf"></a>"#,
        );

        assert_eq!(assets.videos.len(), 1);
        assert_eq!(assets.videos[0].platform, "youtube");
        assert_eq!(assets.documents.len(), 2);
        assert_eq!(assets.documents[0].extension, "hwp");
        assert_eq!(assets.documents[0].title, "주보");
        assert_eq!(assets.documents[1].title, "report.pdf");
    }

    #[test]
    fn test_empty_page() {
        assert!(extract_media(&Html::parse_document("<p>nothing</p>"), &base()).is_none());
    }
}
