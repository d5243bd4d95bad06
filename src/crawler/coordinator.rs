//! Crawler coordinator - main crawl orchestration logic
//!
//! One crawl runs these phases in order:
//! 1. Fetch the homepage (the only fatal failure)
//! 2. Entry resolution to find the effective content root
//! 3. Navigation, popups, boards and site features from the effective page
//! 4. One structure analyzer call, if an analyzer is configured
//! 5. Breadth-first deep crawl of the navigation tree and boards
//! 6. Popup crawl against the same cumulative page budget
//! 7. Homepage extractors, taxonomy and result assembly
//!
//! Every request goes through a single `Fetcher`, so there is never more
//! than one request in flight.

use crate::analyzer::{AnalysisResponse, AnalyzerRequest, HttpAnalyzer, StructureAnalyzer};
use crate::config::{Config, CrawlerConfig};
use crate::crawler::frontier::{Admission, Frontier};
use crate::crawler::parser::{
    classify_content, detect_site_features, extract_boards, extract_content_links, extract_metadata,
    SiteFeatures,
};
use crate::crawler::{build_http_client, Fetcher};
use crate::entry::resolve_entry;
use crate::extract::{
    classify_page, derive_taxonomy, extract_generic, extract_organizations, extract_people,
    extract_site_details, page_text, DictionaryBuilder,
};
use crate::navigation::{clean_title, extract_from_document};
use crate::popup::detect_in_document;
use crate::state::{
    CrawlError, CrawlErrorKind, CrawlProgress, CrawlResult, DictionaryEntry, ExtendedInfo,
    Organization, PageArena, PageId, PageInfo, PageMetadata, PageType, PopupInfo, SiteMetadata,
    SiteStructure, TriggerType,
};
use crate::url::{is_same_domain, normalize_url};
use reqwest::Client;
use scraper::Html;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Observer invoked with a snapshot for every visited page
pub type ProgressCallback = Arc<dyn Fn(&CrawlProgress) + Send + Sync>;

/// Every tenth visited page also gets the generic dictionary pass
const GENERIC_PASS_INTERVAL: usize = 10;

/// Runtime options of one crawl
#[derive(Clone)]
pub struct CrawlOptions {
    /// Deepest level that is still fetched (inclusive)
    pub max_depth: u32,

    /// Page budget shared by the navigation and popup phases
    pub max_pages: usize,

    pub delay_ms: u64,

    /// Follow the navigation tree at all; false stops after the homepage
    pub deep_crawl: bool,

    pub extract_contacts: bool,
    pub extract_media: bool,

    /// Homepage HTML sent to the structure analyzer is cut to this length
    pub max_html_chars: usize,

    pub on_progress: Option<ProgressCallback>,
}

impl CrawlOptions {
    pub fn with_progress(mut self, callback: impl Fn(&CrawlProgress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from(&CrawlerConfig::default())
    }
}

impl From<&CrawlerConfig> for CrawlOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_pages: config.max_pages,
            delay_ms: config.delay_ms,
            deep_crawl: config.deep_crawl,
            extract_contacts: config.extract_contacts,
            extract_media: config.extract_media,
            max_html_chars: 30_000,
            on_progress: None,
        }
    }
}

impl fmt::Debug for CrawlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlOptions")
            .field("max_depth", &self.max_depth)
            .field("max_pages", &self.max_pages)
            .field("delay_ms", &self.delay_ms)
            .field("deep_crawl", &self.deep_crawl)
            .field("extract_contacts", &self.extract_contacts)
            .field("extract_media", &self.extract_media)
            .field("max_html_chars", &self.max_html_chars)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

/// Structure discovery crawler for one organization
///
/// Collaborators are explicit handles: the HTTP client and the optional
/// structure analyzer are passed in once and reused for every crawl.
pub struct Crawler {
    client: Client,
    organization: Organization,
    options: CrawlOptions,
    analyzer: Option<Arc<dyn StructureAnalyzer>>,
}

impl Crawler {
    pub fn new(client: Client, organization: Organization, options: CrawlOptions) -> Self {
        Self {
            client,
            organization,
            options,
            analyzer: None,
        }
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn StructureAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Builds the crawler described by a configuration file
    ///
    /// The analyzer is an `HttpAnalyzer` when the `[analyzer]` section is present.
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout_secs)?;

        let organization = Organization {
            name: config.organization.name.clone(),
            code: config.organization.code.clone(),
            homepage: config.organization.homepage.clone(),
        };

        let mut options = CrawlOptions::from(&config.crawler);
        if let Some(analyzer) = &config.analyzer {
            options.max_html_chars = analyzer.max_html_chars;
        }

        let crawler = Self::new(client.clone(), organization, options);
        Ok(match &config.analyzer {
            Some(analyzer) => crawler.with_analyzer(Arc::new(HttpAnalyzer::new(client, analyzer))),
            None => crawler,
        })
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    pub fn organization(&self) -> &Organization {
        &self.organization
    }

    /// Crawls the configured homepage
    pub async fn crawl(&self) -> CrawlResult {
        let homepage = self.organization.homepage.clone();
        self.crawl_site(&homepage).await
    }

    /// Crawls a site starting from `homepage`
    ///
    /// Always returns a result. Only a homepage that cannot be fetched makes
    /// it unsuccessful; every other failure is recorded and the crawl goes on.
    pub async fn crawl_site(&self, homepage: &str) -> CrawlResult {
        let start = Instant::now();
        let organization = Organization {
            homepage: homepage.to_string(),
            ..self.organization.clone()
        };

        tracing::info!("Starting crawl of {}", homepage);

        let homepage_url = match normalize_url(homepage) {
            Ok(url) => url,
            Err(e) => {
                let error = CrawlError::new(homepage, CrawlErrorKind::HomepageUnreachable, e.to_string());
                return CrawlResult::failed(organization, error, elapsed_ms(start));
            }
        };

        let mut fetcher = Fetcher::new(self.client.clone(), self.options.delay_ms);

        let document = match fetcher.fetch(homepage_url.as_str()).await.into_document() {
            Ok(document) => document,
            Err(message) => {
                tracing::error!("Homepage {} unreachable: {}", homepage_url, message);
                let error = CrawlError::new(homepage_url.as_str(), CrawlErrorKind::HomepageUnreachable, message);
                return CrawlResult::failed(organization, error, elapsed_ms(start));
            }
        };

        let landed = normalize_url(&document.final_url).unwrap_or(homepage_url.clone());
        let mut resolution = resolve_entry(&mut fetcher, landed, document.body).await;
        resolution.visited_urls.push(homepage_url.to_string());
        let base_url = resolution.effective_url.clone();
        if base_url != homepage_url {
            tracing::info!("Effective content root is {}", base_url);
        }

        let xml_navigation = std::mem::take(&mut resolution.xml_navigation);
        let scan = scan_homepage(&resolution.html, &base_url, xml_navigation);

        let mut run = CrawlRun::new(&self.options, base_url.clone());
        run.frontier.mark_visited(resolution.visited_urls.iter().cloned());

        let analysis = self.consult_analyzer(&base_url, &resolution.html, &mut run).await;

        let HomepageScan {
            navigation,
            boards,
            popups,
            features,
            entries,
        } = scan;

        let navigation = if navigation.is_empty() {
            match &analysis {
                Some(analysis) if !analysis.navigation.is_empty() => {
                    tracing::info!("Using analyzer navigation ({} items)", analysis.navigation.len());
                    retain_same_domain(analysis.navigation.clone(), &base_url)
                }
                _ => navigation,
            }
        } else {
            navigation
        };

        match analysis.as_ref().filter(|a| !a.dictionary.is_empty()) {
            Some(analysis) => {
                tracing::info!("Analyzer supplied {} dictionary entries", analysis.dictionary.len());
                run.dictionary.extend(analysis.dictionary.iter().cloned());
                run.use_patterns = false;
            }
            None => {
                run.dictionary.extend(entries);
            }
        }

        let nav_roots = run.arena.insert_tree(navigation);
        let board_ids: Vec<PageId> = boards
            .into_iter()
            .filter_map(|board| run.arena.insert_root(board))
            .collect();
        run.merge_popups(popups);

        tracing::info!(
            "Discovered {} navigation pages, {} boards, {} popups",
            run.arena.len() - board_ids.len(),
            board_ids.len(),
            run.popups.len()
        );

        if self.options.deep_crawl {
            let order = run.arena.breadth_first(&nav_roots);
            run.frontier.extend(order);
            run.frontier.extend(board_ids.iter().copied());

            while let Some(id) = run.frontier.pop() {
                run.visit(&mut fetcher, id, true).await;
            }
            tracing::info!("Navigation phase done: {} pages fetched", run.frontier.fetched());
        }

        let special_ids = run.crawl_popups(&mut fetcher, self.options.deep_crawl).await;

        let details = extract_site_details(
            &resolution.html,
            &base_url,
            self.options.extract_contacts,
            self.options.extract_media,
        );

        let dictionary = run.dictionary.into_entries();
        let taxonomy = match analysis.filter(|a| !a.taxonomy.is_empty()) {
            Some(analysis) => analysis.taxonomy,
            None => derive_taxonomy(&dictionary),
        };

        let mut structure = SiteStructure {
            organization,
            navigation: run.arena.materialize(&nav_roots),
            boards: run.arena.materialize(&board_ids),
            special_pages: run.arena.materialize(&special_ids),
            metadata: SiteMetadata::default(),
            contacts: details.contacts,
            social_media: details.social_media,
            media: details.media,
            worship_times: details.worship_times,
        };
        structure.metadata = site_metadata(&structure, features);

        run.progress.total_pages = run.frontier.fetched() + run.frontier.len();
        run.progress.crawled_pages = run.frontier.fetched();

        let elapsed = elapsed_ms(start);
        tracing::info!(
            "Crawl of {} finished: {} pages fetched, {} dictionary entries, {} errors in {} ms",
            base_url,
            run.frontier.fetched(),
            dictionary.len(),
            run.progress.errors.len(),
            elapsed
        );

        CrawlResult {
            success: true,
            extended: ExtendedInfo::from_structure(&structure),
            structure,
            dictionary,
            taxonomy,
            popups: run.popups,
            errors: run.progress.errors.clone(),
            elapsed_ms: elapsed,
            progress: run.progress,
        }
    }

    /// One analyzer call; any failure or empty answer means pattern extraction only
    async fn consult_analyzer(
        &self,
        base_url: &Url,
        html: &str,
        run: &mut CrawlRun<'_>,
    ) -> Option<AnalysisResponse> {
        let analyzer = self.analyzer.as_ref()?;
        let request = AnalyzerRequest::new(base_url.as_str(), html, self.options.max_html_chars);

        match analyzer.analyze(&request).await {
            Ok(analysis) if !analysis.is_empty() => Some(analysis),
            Ok(_) => {
                tracing::info!("Analyzer answer was empty, using pattern extraction");
                None
            }
            Err(e) => {
                tracing::warn!("Analyzer failed, using pattern extraction: {}", e);
                run.progress
                    .errors
                    .push(CrawlError::new(base_url.as_str(), CrawlErrorKind::AnalyzerFailure, e.to_string()));
                None
            }
        }
    }
}

/// Drops cross-domain nodes (with their subtrees) from a navigation tree
///
/// Label-only nodes without a URL stay.
fn retain_same_domain(items: Vec<PageInfo>, base_url: &Url) -> Vec<PageInfo> {
    items
        .into_iter()
        .filter(|item| item.url.is_empty() || is_same_domain(&item.url, base_url))
        .map(|mut item| {
            item.children = retain_same_domain(std::mem::take(&mut item.children), base_url);
            item
        })
        .collect()
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Mutable state of one crawl
struct CrawlRun<'a> {
    options: &'a CrawlOptions,
    base_url: Url,
    arena: PageArena,
    frontier: Frontier,
    popups: Vec<PopupInfo>,
    popup_urls: HashSet<String>,
    dictionary: DictionaryBuilder,
    /// False once the analyzer has supplied an authoritative dictionary
    use_patterns: bool,
    progress: CrawlProgress,
}

impl<'a> CrawlRun<'a> {
    fn new(options: &'a CrawlOptions, base_url: Url) -> Self {
        Self {
            options,
            frontier: Frontier::new(base_url.clone(), options.max_depth, options.max_pages),
            base_url,
            arena: PageArena::new(),
            popups: Vec::new(),
            popup_urls: HashSet::new(),
            dictionary: DictionaryBuilder::new(),
            use_patterns: true,
            progress: CrawlProgress::default(),
        }
    }

    fn merge_popups(&mut self, found: Vec<PopupInfo>) {
        for popup in found {
            if is_same_domain(&popup.url, &self.base_url) && self.popup_urls.insert(popup.url.clone()) {
                self.popups.push(popup);
            }
        }
    }

    /// Fetches and processes one arena page if the frontier admits it
    async fn visit(&mut self, fetcher: &mut Fetcher, id: PageId, follow_links: bool) {
        let Some(page) = self.arena.get(id) else {
            return;
        };
        if let Admission::Skip(reason) = self.frontier.admit(page) {
            tracing::trace!("Skipping {:?} ({:?})", page.url, reason);
            return;
        }
        let (url, title, depth) = (page.url.clone(), page.title.clone(), page.depth);

        self.report_progress(&url, depth);

        let document = match fetcher.fetch(&url).await.into_document() {
            Ok(document) => document,
            Err(message) => {
                tracing::warn!("Failed to fetch {}: {}", url, message);
                if let Some(node) = self.arena.get_mut(id) {
                    node.crawl_error = Some(message.clone());
                }
                self.progress
                    .errors
                    .push(CrawlError::new(&url, CrawlErrorKind::PageUnreachable, message));
                return;
            }
        };

        let page_url = normalize_url(&document.final_url)
            .ok()
            .filter(|final_url| is_same_domain(final_url.as_str(), &self.base_url))
            .or_else(|| Url::parse(&url).ok())
            .unwrap_or_else(|| self.base_url.clone());

        let passes = self.dictionary_passes(&url, &title, depth);
        let want_links = follow_links && self.frontier.can_descend(depth);
        let scan = scan_page(&document.body, &page_url, &url, passes, want_links);

        tracing::debug!(
            "Processed {} (depth {}): {} links, {} popups, {} entries",
            url,
            depth,
            scan.links.len(),
            scan.popups.len(),
            scan.entries.len()
        );

        if let Some(node) = self.arena.get_mut(id) {
            node.crawled = true;
            node.extracted_data = Some(scan.metadata);
        }
        self.merge_popups(scan.popups);
        self.dictionary.extend(scan.entries);

        for (link, text) in scan.links {
            if self.frontier.is_visited(&link) || self.arena.contains_url(&link) {
                continue;
            }
            let title = clean_title(&text).unwrap_or_else(|| link.clone());
            let content_type = classify_content(&link, &title);
            let child = PageInfo::new(&link, title, PageType::Content, depth + 1).with_content_type(content_type);
            if let Some(child_id) = self.arena.insert_child(id, child) {
                self.frontier.push(child_id);
            }
        }
    }

    /// Places every collected popup and fetches the non-layer ones within the budget
    ///
    /// Popups found on popup pages are appended and handled in the same pass.
    /// A popup whose URL already has a position in the tree is not placed again.
    async fn crawl_popups(&mut self, fetcher: &mut Fetcher, fetch: bool) -> Vec<PageId> {
        let mut special = Vec::new();
        let mut index = 0;

        while let Some(popup) = self.popups.get(index).cloned() {
            index += 1;
            let Some(id) = self.arena.insert_root(popup.to_page_info()) else {
                continue;
            };
            special.push(id);

            if fetch && popup.trigger_type != TriggerType::Layer && !self.frontier.budget_exhausted() {
                self.visit(fetcher, id, false).await;
            }
        }

        if fetch {
            tracing::info!("Popup phase done: {} pages fetched in total", self.frontier.fetched());
        }
        special
    }

    fn dictionary_passes(&self, url: &str, title: &str, depth: u32) -> DictionaryPasses {
        if !self.use_patterns {
            return DictionaryPasses::default();
        }
        let focus = classify_page(url, title);
        let generic = depth == 1 || self.frontier.fetched() % GENERIC_PASS_INTERVAL == 0;
        DictionaryPasses {
            people: focus.people || generic,
            organization: focus.organization || generic,
        }
    }

    fn report_progress(&mut self, url: &str, depth: u32) {
        let crawled = self.frontier.fetched();
        self.progress.crawled_pages = crawled;
        self.progress.total_pages = crawled + self.frontier.len();
        self.progress.current_url = url.to_string();
        self.progress.current_depth = depth;

        if crawled % 10 == 0 {
            tracing::info!(
                "Progress: {} pages crawled, {} queued, {} errors",
                crawled,
                self.frontier.len(),
                self.progress.errors.len()
            );
        }

        if let Some(callback) = &self.options.on_progress {
            callback(&self.progress);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct DictionaryPasses {
    people: bool,
    organization: bool,
}

/// Owned results of scanning one fetched page
struct PageScan {
    metadata: PageMetadata,
    popups: Vec<PopupInfo>,
    links: Vec<(String, String)>,
    entries: Vec<DictionaryEntry>,
}

fn scan_page(body: &str, page_url: &Url, source_url: &str, passes: DictionaryPasses, want_links: bool) -> PageScan {
    let document = Html::parse_document(body);

    let entries = match (passes.organization, passes.people) {
        (true, true) => extract_generic(&document, source_url),
        (true, false) => extract_organizations(&page_text(&document), source_url),
        (false, true) => extract_people(&page_text(&document), source_url),
        (false, false) => Vec::new(),
    };

    PageScan {
        metadata: extract_metadata(&document, page_url),
        popups: detect_in_document(&document, page_url),
        links: if want_links {
            extract_content_links(&document, page_url)
        } else {
            Vec::new()
        },
        entries,
    }
}

/// Owned results of scanning the effective homepage
struct HomepageScan {
    navigation: Vec<PageInfo>,
    boards: Vec<PageInfo>,
    popups: Vec<PopupInfo>,
    features: SiteFeatures,
    entries: Vec<DictionaryEntry>,
}

/// A non-empty XML menu wins over the HTML waterfall
fn scan_homepage(html_text: &str, base_url: &Url, xml_navigation: Vec<PageInfo>) -> HomepageScan {
    let document = Html::parse_document(html_text);

    let navigation = if xml_navigation.is_empty() {
        extract_from_document(&document, base_url)
    } else {
        xml_navigation
    };

    let mut known = HashSet::new();
    for item in &navigation {
        item.walk(&mut |page| {
            known.insert(page.url.clone());
        });
    }

    let entries = extract_generic(&document, base_url.as_str());

    HomepageScan {
        boards: extract_boards(&document, base_url, &known),
        popups: detect_in_document(&document, base_url),
        features: detect_site_features(&document, base_url),
        navigation,
        entries,
    }
}

fn site_metadata(structure: &SiteStructure, features: SiteFeatures) -> SiteMetadata {
    let mut total_pages = 0;
    let mut max_depth = 0;
    structure.walk_pages(&mut |page| {
        total_pages += 1;
        max_depth = max_depth.max(page.depth);
    });

    SiteMetadata {
        total_pages,
        max_depth,
        has_login: features.has_login,
        has_mobile_version: features.has_mobile_version,
        technologies: features.technologies,
    }
}
