//! Navigation tree extraction
//!
//! The waterfall runs in two phases:
//!
//! 1. Extract strategies are tried in order; the first one that yields at
//!    least one top-level item wins.
//! 2. If every top-level item is childless, the panel enrichers run in
//!    order and fill in children from separately rendered panels.
//!
//! # Components
//!
//! - `collector`: per-pass dedup and title rules shared by all strategies
//! - `strategies`: the `NavStrategy` trait, the ordered `STRATEGIES` array
//!   and the extract strategies
//! - `panels`: the two enrichers

mod collector;
mod panels;
mod strategies;

pub use collector::{clean_title, NavCollector, MAX_NAV_DEPTH, MAX_TITLE_CHARS};
pub use panels::{PanelByFragment, PanelById};
pub use strategies::{
    DataAttribute, DepthClass, FrameworkNav, HeaderScan, MegaMenu, NavStrategy, StandardNav,
    StrategyMode, STRATEGIES,
};

use crate::state::PageInfo;
use scraper::Html;
use url::Url;

/// Extracts the navigation tree from raw HTML
pub fn extract_navigation(html: &str, base_url: &Url) -> Vec<PageInfo> {
    let document = Html::parse_document(html);
    extract_from_document(&document, base_url)
}

/// Runs the waterfall over a parsed document
pub fn extract_from_document(document: &Html, base_url: &Url) -> Vec<PageInfo> {
    let mut items = Vec::new();

    for strategy in STRATEGIES.iter().filter(|s| s.mode() == StrategyMode::Extract) {
        items = strategy.extract(document, base_url);
        if !items.is_empty() {
            tracing::debug!(
                "Navigation strategy '{}' found {} top-level items",
                strategy.name(),
                items.len()
            );
            break;
        }
        tracing::trace!("Navigation strategy '{}' found nothing", strategy.name());
    }

    if items.is_empty() {
        return items;
    }

    for enricher in STRATEGIES.iter().filter(|s| s.mode() == StrategyMode::Enrich) {
        if items.iter().any(|item| !item.children.is_empty()) {
            break;
        }
        if enricher.enrich(document, base_url, &mut items) {
            tracing::debug!("Navigation enricher '{}' added submenus", enricher.name());
        }
    }

    items
}
