//! Entry resolution chain
//!
//! Finds the page that actually carries a site's content. Four detectors run
//! in fixed order against the current page:
//!
//! 1. `meta_refresh`: `<meta http-equiv="refresh">` redirects (up to three hops)
//! 2. `intro`: intro/landing pages with an "enter site" link
//! 3. `iframe`: thin shells wrapping a full-page frame
//! 4. `xml_menu`: a menu served as XML instead of markup
//!
//! A detector that finds nothing, or whose target cannot be fetched, leaves
//! the current page in place. None of them can fail the crawl.

pub mod iframe;
pub mod intro;
pub mod meta_refresh;
pub mod xml_menu;

use crate::crawler::Fetcher;
use crate::state::PageInfo;
use crate::url::normalize_url;
use url::Url;

/// Meta refresh chains longer than this are abandoned
pub const MAX_REFRESH_HOPS: usize = 3;

/// The effective content root found by the chain
#[derive(Debug, Clone)]
pub struct EntryResolution {
    /// Anchors relative-link resolution and same-domain checks from here on
    pub effective_url: Url,

    /// HTML of the effective page (shell and frame content concatenated for iframe sites)
    pub html: String,

    /// Every URL fetched while resolving, homepage included
    pub visited_urls: Vec<String>,

    /// Navigation parsed from a menu XML file, empty if none was found
    pub xml_navigation: Vec<PageInfo>,
}

impl EntryResolution {
    fn new(homepage: Url, html: String) -> Self {
        Self {
            visited_urls: vec![homepage.to_string()],
            effective_url: homepage,
            html,
            xml_navigation: Vec::new(),
        }
    }

    fn has_visited(&self, url: &str) -> bool {
        self.visited_urls.iter().any(|visited| visited == url)
    }

    fn record_visit(&mut self, url: &str) {
        if !self.has_visited(url) {
            self.visited_urls.push(url.to_string());
        }
    }
}

/// Runs the chain starting from the already fetched homepage
pub async fn resolve_entry(fetcher: &mut Fetcher, homepage: Url, html: String) -> EntryResolution {
    let mut state = EntryResolution::new(homepage, html);

    for _ in 0..MAX_REFRESH_HOPS {
        let Some(target) = meta_refresh::detect(&state.html, &state.effective_url) else {
            break;
        };
        if state.has_visited(&target) {
            break;
        }
        tracing::info!("Following meta refresh to {}", target);
        match follow(fetcher, &mut state, &target).await {
            Some((url, body)) => {
                state.effective_url = url;
                state.html = body;
            }
            None => break,
        }
    }

    if let Some(target) = intro::detect(&state.html, &state.effective_url) {
        if !state.has_visited(&target) {
            tracing::info!("Skipping intro page via {}", target);
            if let Some((url, body)) = follow(fetcher, &mut state, &target).await {
                state.effective_url = url;
                state.html = body;
            }
        }
    }

    if let Some(target) = iframe::detect(&state.html, &state.effective_url) {
        if !state.has_visited(&target) {
            tracing::info!("Homepage wraps a frame, following {}", target);
            if let Some((url, body)) = follow(fetcher, &mut state, &target).await {
                state.effective_url = url;
                state.html = format!("{}\n{}", state.html, body);
            }
        }
    }

    state.xml_navigation = discover_xml_menu(fetcher, &state).await;
    state
}

/// Fetches a detector target; failures are tolerated and reported as None
async fn follow(fetcher: &mut Fetcher, state: &mut EntryResolution, target: &str) -> Option<(Url, String)> {
    state.record_visit(target);

    match fetcher.fetch(target).await.into_document() {
        Ok(document) => {
            let effective = normalize_url(&document.final_url)
                .or_else(|_| normalize_url(target))
                .ok()?;
            state.record_visit(effective.as_str());
            Some((effective, document.body))
        }
        Err(e) => {
            tracing::debug!("Entry target {} unavailable: {}", target, e);
            None
        }
    }
}

async fn discover_xml_menu(fetcher: &mut Fetcher, state: &EntryResolution) -> Vec<PageInfo> {
    let referenced = xml_menu::find_script_reference(&state.html, &state.effective_url);

    let candidates = match referenced {
        Some(url) => vec![url],
        None => {
            let mut found = Vec::new();
            for url in xml_menu::candidate_urls(&state.effective_url) {
                if fetcher.probe(&url).await {
                    found.push(url);
                    break;
                }
            }
            found
        }
    };

    for url in candidates {
        let Ok(document) = fetcher.fetch(&url).await.into_document() else {
            continue;
        };
        let items = xml_menu::parse_menu(&document.body, &state.effective_url);
        if !items.is_empty() {
            tracing::info!("Loaded {} menu items from {}", items.len(), url);
            return items;
        }
    }

    Vec::new()
}
