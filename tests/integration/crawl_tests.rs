//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use steeple::analyzer::{
    AnalysisResponse, AnalyzerRequest, AnalyzerResult, HttpAnalyzer, StructureAnalyzer,
};
use steeple::config::{
    AnalyzerConfig, Config, CrawlerConfig, OrganizationConfig, OutputConfig, UserAgentConfig,
};
use steeple::crawler::build_http_client;
use steeple::state::{CrawlErrorKind, EntryCategory, Organization, PageType, TriggerType};
use steeple::storage::{SqliteStorage, Storage};
use steeple::{CrawlOptions, CrawlResult, Crawler};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

fn organization(homepage: &str) -> Organization {
    Organization {
        name: "Test Church".to_string(),
        code: "test".to_string(),
        homepage: homepage.to_string(),
    }
}

fn options(max_depth: u32, max_pages: usize) -> CrawlOptions {
    CrawlOptions {
        max_depth,
        max_pages,
        delay_ms: 0,
        ..CrawlOptions::default()
    }
}

fn create_crawler(server: &MockServer, options: CrawlOptions) -> Crawler {
    let client = build_http_client(&user_agent(), 5).unwrap();
    Crawler::new(client, organization(&homepage(server)), options)
}

fn homepage(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

fn page(body: &str) -> String {
    format!(
        "<html><head><title>Test Page</title></head><body>{}</body></html>",
        body
    )
}

/// Mounts a menu XML file that must be requested exactly once
async fn mount_menu_xml(server: &MockServer, route: &str, xml: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(xml.to_string(), "text/xml; charset=utf-8"))
        .expect(1)
        .mount(server)
        .await;
}

/// Mounts an HTML page that must be requested exactly `times` times
async fn mount_page(server: &MockServer, route: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .expect(times)
        .mount(server)
        .await;
}

async fn requests_under(server: &MockServer, prefix: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path().starts_with(prefix))
        .count()
}

fn find<'a>(result: &'a CrawlResult, url: &str) -> Option<&'a steeple::PageInfo> {
    let mut found = None;
    result.structure.walk_pages(&mut |page| {
        if found.is_none() && page.url == url {
            found = Some(page);
        }
    });
    found
}

const TWO_BY_TWO_NAV: &str = r#"<nav><ul>
    <li><a href="/about">About</a><ul>
        <li><a href="/about/history">History</a></li>
        <li><a href="/about/vision">Vision</a></li>
    </ul></li>
    <li><a href="/worship">Worship</a><ul>
        <li><a href="/worship/sunday">Sunday</a></li>
        <li><a href="/worship/weekday">Weekday</a></li>
    </ul></li>
    <li><a href="/main">Home</a></li>
</ul></nav>"#;

/// Meta refresh homepage leading to a two-by-two menu
async fn mount_refresh_site(server: &MockServer) {
    mount_page(
        server,
        "/",
        r#"<html><head><meta http-equiv="refresh" content="0; url=/main"></head><body></body></html>"#
            .to_string(),
        1,
    )
    .await;
    mount_page(server, "/main", page(TWO_BY_TWO_NAV), 1).await;

    for route in ["/about", "/worship"] {
        mount_page(server, route, page(r#"<div id="content"><p>Welcome</p></div>"#), 1).await;
    }
    for route in [
        "/about/history",
        "/about/vision",
        "/worship/sunday",
        "/worship/weekday",
    ] {
        mount_page(
            server,
            route,
            page(&format!(
                r#"<div id="content"><a href="{}/archive">Archive</a></div>"#,
                route
            )),
            1,
        )
        .await;
        mount_page(server, &format!("{}/archive", route), page("<p>deep</p>"), 0).await;
    }
}

#[tokio::test]
async fn test_meta_refresh_site_crawls_two_levels() {
    let server = MockServer::start().await;
    mount_refresh_site(&server).await;

    let crawler = create_crawler(&server, options(2, 100));
    let result = crawler.crawl().await;

    assert!(result.success);
    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);

    let navigation = &result.structure.navigation;
    let titles: Vec<_> = navigation.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["About", "Worship", "Home"]);

    for menu in &navigation[..2] {
        assert_eq!(menu.depth, 1);
        assert_eq!(menu.page_type, PageType::Menu);
        assert!(menu.crawled);
        assert_eq!(menu.children.len(), 2);
        for child in &menu.children {
            assert_eq!(child.depth, 2);
            assert_eq!(child.parent_url.as_deref(), Some(menu.url.as_str()));
            assert!(child.crawled);
            assert!(child.children.is_empty());
        }
    }

    // The entry page is visited during resolution and never fetched again
    assert!(!navigation[2].crawled);
    assert_eq!(result.progress.crawled_pages, 6);
    assert_eq!(result.structure.metadata.max_depth, 2);

    server.verify().await;
}

#[tokio::test]
async fn test_relative_links_resolve_against_effective_root() {
    let server = MockServer::start().await;
    mount_refresh_site(&server).await;

    let result = create_crawler(&server, options(2, 100)).crawl().await;

    let about = &result.structure.navigation[0];
    assert_eq!(about.url, format!("{}/about", server.uri()));
    assert_eq!(about.children[0].url, format!("{}/about/history", server.uri()));
    assert!(about
        .extracted_data
        .as_ref()
        .is_some_and(|data| data.title.as_deref() == Some("Test Page")));
}

#[tokio::test]
async fn test_popup_pages_are_fetched_and_cross_domain_excluded() {
    let server = MockServer::start().await;
    let offsite = server.uri().replace("127.0.0.1", "localhost");

    mount_page(
        &server,
        "/",
        page(&format!(
            r##"<nav><ul><li><a href="/about">About</a></li></ul></nav>
            <div class="footer">
                <a href="javascript:void(0)" onclick="window.open('/popup/event.html')">행사 안내</a>
                <a href="javascript:void(0)" onclick="window.open('{}/popup/promo.html')">Promo</a>
                <a href="#layer_notice" class="layer-open">안내</a>
            </div>"##,
            offsite
        )),
        1,
    )
    .await;
    mount_page(&server, "/about", page(r#"<div id="content"><p>About</p></div>"#), 1).await;
    mount_page(&server, "/popup/event.html", page("<p>Event</p>"), 1).await;
    mount_page(&server, "/popup/promo.html", page("<p>Promo</p>"), 0).await;

    let result = create_crawler(&server, options(3, 100)).crawl().await;

    assert!(result.success);
    assert_eq!(result.popups.len(), 2);

    let event = &result.popups[0];
    assert_eq!(event.url, format!("{}/popup/event.html", server.uri()));
    assert_eq!(event.trigger_type, TriggerType::WindowOpen);
    assert_eq!(event.title, "행사 안내");
    assert_eq!(result.popups[1].trigger_type, TriggerType::Layer);

    let specials = &result.structure.special_pages;
    assert_eq!(specials.len(), 2);
    assert_eq!(specials[0].page_type, PageType::Popup);
    assert_eq!(specials[0].depth, 0);
    assert!(specials[0].crawled);
    assert_eq!(specials[1].page_type, PageType::Modal);
    assert!(!specials[1].crawled);

    assert!(result.popups.iter().all(|p| !p.url.contains("localhost")));

    server.verify().await;
}

#[tokio::test]
async fn test_unreachable_homepage_fails_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = create_crawler(&server, options(3, 100)).crawl().await;

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, CrawlErrorKind::HomepageUnreachable);
    assert!(result.structure.navigation.is_empty());
    assert!(result.popups.is_empty());
    assert!(result.dictionary.is_empty());
}

#[tokio::test]
async fn test_failed_page_is_recorded_and_crawl_continues() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page(r#"<nav><ul><li><a href="/broken">Broken</a></li><li><a href="/fine">Fine</a></li></ul></nav>"#),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/fine", page("<p>Fine</p>"), 1).await;

    let result = create_crawler(&server, options(3, 100)).crawl().await;

    assert!(result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, CrawlErrorKind::PageUnreachable);

    let broken = &result.structure.navigation[0];
    assert!(!broken.crawled);
    assert!(broken.crawl_error.is_some());
    assert!(result.structure.navigation[1].crawled);

    server.verify().await;
}

#[tokio::test]
async fn test_page_budget_spans_navigation_and_popups() {
    let server = MockServer::start().await;

    let items: String = (1..=5)
        .map(|i| format!(r#"<li><a href="/page{}">Page {}</a></li>"#, i, i))
        .collect();
    mount_page(
        &server,
        "/",
        page(&format!(
            r#"<nav><ul>{}</ul></nav>
            <span onclick="window.open('/popup/extra.html')">Extra</span>"#,
            items
        )),
        1,
    )
    .await;
    for i in 1..=5 {
        Mock::given(method("GET"))
            .and(path(format!("/page{}", i)))
            .respond_with(ResponseTemplate::new(200).set_body_raw(page("<p>x</p>"), "text/html"))
            .mount(&server)
            .await;
    }
    mount_page(&server, "/popup/extra.html", page("<p>extra</p>"), 0).await;

    let result = create_crawler(&server, options(3, 3)).crawl().await;

    assert!(result.success);
    assert_eq!(requests_under(&server, "/page").await, 3);
    assert_eq!(result.progress.crawled_pages, 3);

    let crawled: Vec<_> = result
        .structure
        .navigation
        .iter()
        .filter(|p| p.crawled)
        .map(|p| p.title.as_str())
        .collect();
    assert_eq!(crawled, vec!["Page 1", "Page 2", "Page 3"]);

    // Placed as a special page but never fetched
    assert_eq!(result.structure.special_pages.len(), 1);
    assert!(!result.structure.special_pages[0].crawled);

    server.verify().await;
}

#[tokio::test]
async fn test_shared_page_is_fetched_once_at_first_position() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page(r#"<nav><ul><li><a href="/a">A</a></li><li><a href="/b">B</a></li></ul></nav>"#),
        1,
    )
    .await;
    for route in ["/a", "/b"] {
        mount_page(
            &server,
            route,
            page(r#"<div id="content"><a href="/shared">Shared</a></div>"#),
            1,
        )
        .await;
    }
    mount_page(&server, "/shared", page("<p>shared</p>"), 1).await;

    let result = create_crawler(&server, options(3, 100)).crawl().await;

    let navigation = &result.structure.navigation;
    assert_eq!(navigation[0].children.len(), 1);
    assert_eq!(navigation[0].children[0].title, "Shared");
    assert_eq!(navigation[0].children[0].page_type, PageType::Content);
    assert_eq!(navigation[0].children[0].depth, 2);
    assert!(navigation[1].children.is_empty());

    let shared = find(&result, &format!("{}/shared", server.uri())).unwrap();
    assert!(shared.crawled);

    server.verify().await;
}

#[tokio::test]
async fn test_cross_domain_links_are_never_followed() {
    let server = MockServer::start().await;
    let offsite = server.uri().replace("127.0.0.1", "localhost");

    mount_page(
        &server,
        "/",
        page(&format!(
            r#"<nav><ul><li><a href="/about">About</a></li><li><a href="{}/offsite">Offsite</a></li></ul></nav>"#,
            offsite
        )),
        1,
    )
    .await;
    mount_page(
        &server,
        "/about",
        page(&format!(
            r#"<div id="content"><a href="{}/offsite/content">Elsewhere</a></div>"#,
            offsite
        )),
        1,
    )
    .await;
    mount_page(&server, "/offsite", page("<p>offsite</p>"), 0).await;
    mount_page(&server, "/offsite/content", page("<p>offsite</p>"), 0).await;

    let result = create_crawler(&server, options(3, 100)).crawl().await;

    assert_eq!(result.structure.navigation.len(), 1);
    assert!(result.structure.navigation[0].children.is_empty());
    assert_eq!(requests_under(&server, "/offsite").await, 0);

    server.verify().await;
}

#[tokio::test]
async fn test_deep_crawl_disabled_fetches_only_homepage() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page(r#"<nav><ul><li><a href="/about">About</a></li></ul></nav>"#),
        1,
    )
    .await;
    mount_page(&server, "/about", page("<p>About</p>"), 0).await;

    let mut options = options(3, 100);
    options.deep_crawl = false;
    let result = create_crawler(&server, options).crawl().await;

    assert!(result.success);
    assert_eq!(result.structure.navigation.len(), 1);
    assert!(!result.structure.navigation[0].crawled);
    assert_eq!(result.progress.crawled_pages, 0);

    server.verify().await;
}

#[tokio::test]
async fn test_progress_callback_sees_every_visit() {
    let server = MockServer::start().await;
    mount_refresh_site(&server).await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let options = options(2, 100).with_progress(move |progress| {
        assert!(!progress.current_url.is_empty());
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let result = create_crawler(&server, options).crawl().await;

    assert_eq!(calls.load(Ordering::SeqCst), result.progress.crawled_pages);
}

#[tokio::test]
async fn test_analyzer_dictionary_is_authoritative() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page(r#"<nav><ul><li><a href="/about">About</a></li></ul></nav><p>국제선교부 김철수 목사</p>"#),
        1,
    )
    .await;
    mount_page(&server, "/about", page("<p>청년부 박영희 전도사</p>"), 1).await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"```json
            {
                "dictionary": [{"term": "새가족부", "category": "department", "subcategory": "care"}],
                "taxonomy": [{"name": "ministries", "children": [{"name": "care"}]}]
            }
            ```"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = build_http_client(&user_agent(), 5).unwrap();
    let analyzer = HttpAnalyzer::new(
        client.clone(),
        &AnalyzerConfig {
            endpoint: format!("{}/analyze", server.uri()),
            max_html_chars: 30_000,
            timeout_secs: 5,
        },
    );
    let crawler = Crawler::new(client, organization(&homepage(&server)), options(3, 100))
        .with_analyzer(Arc::new(analyzer));

    let result = crawler.crawl().await;

    assert!(result.success);
    assert_eq!(result.dictionary.len(), 1);
    assert_eq!(result.dictionary[0].term, "새가족부");
    assert_eq!(result.dictionary[0].category, EntryCategory::Department);
    assert_eq!(result.taxonomy.len(), 1);
    assert_eq!(result.taxonomy[0].name, "ministries");

    server.verify().await;
}

#[tokio::test]
async fn test_analyzer_failure_is_recorded_but_not_fatal() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page(r#"<nav><ul><li><a href="/about">About</a></li></ul></nav>"#),
        1,
    )
    .await;
    mount_page(&server, "/about", page("<p>About</p>"), 1).await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = build_http_client(&user_agent(), 5).unwrap();
    let analyzer = HttpAnalyzer::new(
        client.clone(),
        &AnalyzerConfig {
            endpoint: format!("{}/analyze", server.uri()),
            max_html_chars: 1_000,
            timeout_secs: 5,
        },
    );
    let crawler = Crawler::new(client, organization(&homepage(&server)), options(3, 100))
        .with_analyzer(Arc::new(analyzer));

    let result = crawler.crawl().await;

    assert!(result.success);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, CrawlErrorKind::AnalyzerFailure);
    assert!(result.structure.navigation[0].crawled);

    server.verify().await;
}

#[tokio::test]
async fn test_crawl_from_config_and_persist() {
    let server = MockServer::start().await;
    mount_refresh_site(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("steeple.db");

    let config = Config {
        crawler: CrawlerConfig {
            max_depth: 2,
            delay_ms: 0,
            request_timeout_secs: 5,
            ..CrawlerConfig::default()
        },
        user_agent: user_agent(),
        output: OutputConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            summary_path: dir.path().join("summary.md").to_string_lossy().into_owned(),
        },
        organization: OrganizationConfig {
            name: "Test Church".to_string(),
            code: "test".to_string(),
            homepage: homepage(&server),
        },
        analyzer: None,
    };

    let result = steeple::crawler::crawl(&config).await.unwrap();
    assert!(result.success);

    let mut storage = SqliteStorage::new(&db_path).unwrap();
    let report = storage.save_crawl(&result, "hash-1").unwrap();
    assert_eq!(report.pages, 7);
    assert_eq!(report.failed_rows, 0);

    let navigation = storage.load_navigation("test").unwrap();
    assert_eq!(navigation, result.structure.navigation);

    // A second save replaces rather than appends
    storage.save_crawl(&result, "hash-2").unwrap();
    let stats = storage.organization_stats("test").unwrap().unwrap();
    assert_eq!(stats.navigation_pages, 7);
    assert_eq!(stats.crawled_pages, 6);

    let log = storage.latest_crawl_log("test").unwrap().unwrap();
    assert_eq!(log.config_hash, "hash-2");
    assert_eq!(log.pages_crawled, 6);
    assert!(log.success);
}

/// Analyzer that answers every request with a fixed menu
struct FixedMenuAnalyzer {
    navigation: Vec<steeple::PageInfo>,
}

#[async_trait]
impl StructureAnalyzer for FixedMenuAnalyzer {
    async fn analyze(&self, _request: &AnalyzerRequest) -> AnalyzerResult<AnalysisResponse> {
        Ok(AnalysisResponse {
            navigation: self.navigation.clone(),
            ..AnalysisResponse::default()
        })
    }
}

#[tokio::test]
async fn test_analyzer_navigation_drops_cross_domain_items() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page("<p>Welcome</p>"), 1).await;
    mount_page(&server, "/about", page("<p>About</p>"), 1).await;

    let about_url = format!("{}/about", server.uri());
    let analyzer = FixedMenuAnalyzer {
        navigation: vec![
            steeple::PageInfo::new(about_url.as_str(), "About", PageType::Menu, 1),
            steeple::PageInfo::new("https://other.example/x", "Elsewhere", PageType::Menu, 1),
        ],
    };
    let crawler = create_crawler(&server, options(3, 100)).with_analyzer(Arc::new(analyzer));

    let result = crawler.crawl().await;

    assert!(result.success);
    assert_eq!(result.structure.navigation.len(), 1);
    assert_eq!(result.structure.navigation[0].url, about_url);
    assert!(result.structure.navigation[0].crawled);
    assert!(find(&result, "https://other.example/x").is_none());

    server.verify().await;
}

#[tokio::test]
async fn test_intro_page_is_skipped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page(r#"<div class="intro_wrap">
            <video src="/intro.mp4" autoplay muted></video>
            <a class="btn-skip" href="/main">Skip intro</a>
        </div>"#),
        1,
    )
    .await;
    mount_page(
        &server,
        "/main",
        page(r#"<nav><ul><li><a href="/about">About</a></li><li><a href="/main">Home</a></li></ul></nav>"#),
        1,
    )
    .await;
    mount_page(&server, "/about", page(r#"<div id="content"><p>About</p></div>"#), 1).await;

    let result = create_crawler(&server, options(3, 100)).crawl().await;

    assert!(result.success);
    let about = find(&result, &format!("{}/about", server.uri())).unwrap();
    assert!(about.crawled);
    assert_eq!(about.depth, 1);
    assert_eq!(result.progress.crawled_pages, 1);

    // The intro and the main page were fetched during entry resolution only
    server.verify().await;
}

#[tokio::test]
async fn test_iframe_shell_combines_frame_navigation_and_shell_chrome() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page(r#"<div class="footer">TEL 02-123-4567</div>
            <iframe name="mainFrame" src="/frame/main.html" width="100%" height="100%"></iframe>"#),
        1,
    )
    .await;
    mount_page(
        &server,
        "/frame/main.html",
        page(r#"<nav><ul>
            <li><a href="/about">About</a></li>
            <li><a href="/worship">Worship</a></li>
        </ul></nav>"#),
        1,
    )
    .await;
    for route in ["/about", "/worship"] {
        mount_page(&server, route, page(r#"<div id="content"><p>Welcome</p></div>"#), 1).await;
    }

    let result = create_crawler(&server, options(3, 100)).crawl().await;

    assert!(result.success);
    let navigation = &result.structure.navigation;
    assert_eq!(navigation.len(), 2);
    assert_eq!(navigation[0].url, format!("{}/about", server.uri()));
    assert_eq!(navigation[1].url, format!("{}/worship", server.uri()));
    assert!(navigation.iter().all(|item| item.crawled));

    let contacts = result.structure.contacts.as_ref().unwrap();
    assert_eq!(contacts.phone.as_deref(), Some("02-123-4567"));

    server.verify().await;
}

#[tokio::test]
async fn test_script_referenced_menu_xml_becomes_navigation() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        page(r#"<script>$(function () { loadMenu('/common/xml/gnb_menu.xml'); });</script>
            <div id="content"><p>Welcome</p></div>"#),
        1,
    )
    .await;
    mount_menu_xml(
        &server,
        "/common/xml/gnb_menu.xml",
        r#"<?xml version="1.0" encoding="UTF-8"?>
        <menu>
            <depth1 name="About" url="/about">
                <depth2 name="History" url="/about/history"/>
            </depth1>
            <depth1 name="Home" url="/"/>
        </menu>"#,
    )
    .await;
    mount_page(&server, "/about", page("<p>About</p>"), 1).await;
    mount_page(&server, "/about/history", page("<p>History</p>"), 1).await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;

    let result = create_crawler(&server, options(3, 100)).crawl().await;

    assert!(result.success);
    let navigation = &result.structure.navigation;
    assert_eq!(navigation.len(), 2);
    assert_eq!(navigation[0].title, "About");
    assert!(navigation[0].crawled);
    assert_eq!(navigation[0].children.len(), 1);
    assert_eq!(navigation[0].children[0].url, format!("{}/about/history", server.uri()));
    assert_eq!(navigation[0].children[0].depth, 2);
    assert!(navigation[0].children[0].crawled);

    // The homepage menu item stays in the tree but is never fetched again
    assert_eq!(navigation[1].title, "Home");
    assert!(!navigation[1].crawled);
    assert_eq!(result.progress.crawled_pages, 2);

    server.verify().await;
}

#[tokio::test]
async fn test_menu_xml_found_at_conventional_path() {
    let server = MockServer::start().await;
    mount_page(&server, "/", page(r#"<div id="content"><p>Welcome</p></div>"#), 1).await;
    for (route, status, times) in [
        ("/menu.xml", 404, 1),
        ("/xml/menu.xml", 200, 1),
        ("/data/menu.xml", 200, 0),
        ("/common/xml/menu.xml", 200, 0),
    ] {
        Mock::given(method("HEAD"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .expect(times)
            .mount(&server)
            .await;
    }
    mount_menu_xml(
        &server,
        "/xml/menu.xml",
        r#"<menu>
            <depth1>
                <name>Worship</name>
                <link>/worship</link>
                <depth2><name>Sunday</name><link>%2Fworship%2Fsunday</link></depth2>
            </depth1>
        </menu>"#,
    )
    .await;
    mount_page(&server, "/worship", page("<p>Worship</p>"), 1).await;
    mount_page(&server, "/worship/sunday", page("<p>Sunday</p>"), 1).await;

    let result = create_crawler(&server, options(3, 100)).crawl().await;

    assert!(result.success);
    let navigation = &result.structure.navigation;
    assert_eq!(navigation.len(), 1);
    assert_eq!(navigation[0].url, format!("{}/worship", server.uri()));
    assert_eq!(navigation[0].children[0].title, "Sunday");
    assert_eq!(navigation[0].children[0].url, format!("{}/worship/sunday", server.uri()));
    assert!(navigation[0].children[0].crawled);

    server.verify().await;
}
