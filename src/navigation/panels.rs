//! Panel enrichers for template menus whose children live in a separate element
//!
//! Some site templates render the top menu as a row of tabs and place each
//! tab's links in a panel elsewhere in the document. The tab points at its
//! panel either through an attribute (`data-target`, `aria-controls`) or
//! through a fragment href.

use crate::html::{self, LINK_SELECTOR};
use crate::navigation::collector::{clean_title, element_label, NavCollector};
use crate::navigation::strategies::{NavStrategy, StrategyMode};
use crate::state::PageInfo;
use crate::url::resolve_href;
use scraper::{ElementRef, Html};
use url::Url;

/// Tabs that name their panel in `data-target`, `aria-controls` or `data-menu`
pub struct PanelById;

impl NavStrategy for PanelById {
    fn name(&self) -> &'static str {
        "panel-by-id"
    }

    fn mode(&self) -> StrategyMode {
        StrategyMode::Enrich
    }

    fn enrich(&self, document: &Html, base_url: &Url, items: &mut [PageInfo]) -> bool {
        let Some(triggers) = html::selector("[data-target], [aria-controls], [data-menu], [data-panel]") else {
            return false;
        };

        let pairs = document.select(&triggers).filter_map(|trigger| {
            let value = trigger.value();
            let target = value
                .attr("data-target")
                .or_else(|| value.attr("aria-controls"))
                .or_else(|| value.attr("data-menu"))
                .or_else(|| value.attr("data-panel"))?;
            Some((trigger, target.trim().trim_start_matches('#').to_string()))
        });

        fill_from_panels(document, base_url, items, pairs)
    }
}

/// Tabs whose href is a fragment naming the panel (`href="#menu2"`)
pub struct PanelByFragment;

impl NavStrategy for PanelByFragment {
    fn name(&self) -> &'static str {
        "panel-by-fragment"
    }

    fn mode(&self) -> StrategyMode {
        StrategyMode::Enrich
    }

    fn enrich(&self, document: &Html, base_url: &Url, items: &mut [PageInfo]) -> bool {
        let Some(triggers) = html::selector("a[href^='#']") else {
            return false;
        };

        let pairs = document.select(&triggers).filter_map(|trigger| {
            let fragment = trigger.value().attr("href")?.trim().trim_start_matches('#');
            (!fragment.is_empty()).then(|| (trigger, fragment.to_string()))
        });

        fill_from_panels(document, base_url, items, pairs)
    }
}

/// Matches each trigger to a childless top item and reads the panel's links as children
fn fill_from_panels<'a>(
    document: &'a Html,
    base_url: &Url,
    items: &mut [PageInfo],
    pairs: impl Iterator<Item = (ElementRef<'a>, String)>,
) -> bool {
    let taken = items.iter().filter(|p| p.has_url()).map(|p| p.url.clone());
    let mut collector = NavCollector::with_seen(base_url, taken);
    let mut enriched = false;

    for (trigger, panel_id) in pairs {
        let Some(item) = find_item(items, trigger, base_url) else {
            continue;
        };
        if !item.children.is_empty() {
            continue;
        }

        let Some(panel) = find_by_id(document, &panel_id) else {
            continue;
        };

        let children: Vec<PageInfo> = panel
            .select(&LINK_SELECTOR)
            .filter_map(|anchor| collector.accept_element(anchor, item.depth + 1))
            .collect();

        if !children.is_empty() {
            tracing::trace!("Panel #{} enriched '{}' with {} items", panel_id, item.title, children.len());
            item.children = children;
            enriched = true;
        }
    }

    enriched
}

/// Finds the top item a trigger belongs to, by resolved URL and then by label
fn find_item<'i>(items: &'i mut [PageInfo], trigger: ElementRef<'_>, base_url: &Url) -> Option<&'i mut PageInfo> {
    let url = trigger
        .value()
        .attr("href")
        .and_then(|href| resolve_href(href, base_url));
    let label = clean_title(&element_label(trigger));

    let index = items
        .iter()
        .position(|item| url.as_deref().is_some_and(|u| item.url == u))
        .or_else(|| {
            let label = label.as_deref()?;
            items.iter().position(|item| item.title == label)
        })?;
    items.get_mut(index)
}

fn find_by_id<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    if id.is_empty() || id.contains(['\'', '"', '\\']) {
        return None;
    }
    html::select_first(document, &format!("[id='{}']", id))
}
