//! Navigation extraction strategies
//!
//! Each strategy is a stateless unit struct. Extract strategies build a tree
//! from scratch; the waterfall in `mod.rs` decides which one wins.

use crate::html::{self, NAV_CONTAINERS};
use crate::navigation::collector::{element_label, NavCollector, MAX_NAV_DEPTH};
use crate::navigation::panels::{PanelByFragment, PanelById};
use crate::state::PageInfo;
use crate::url::resolve_href;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Whether a strategy builds a tree or fills in children of an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyMode {
    Extract,
    Enrich,
}

/// One entry of the navigation waterfall
pub trait NavStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn mode(&self) -> StrategyMode {
        StrategyMode::Extract
    }

    /// Builds top-level items from the document
    fn extract(&self, _document: &Html, _base_url: &Url) -> Vec<PageInfo> {
        Vec::new()
    }

    /// Adds children to childless top-level items, returning true if any were added
    fn enrich(&self, _document: &Html, _base_url: &Url, _items: &mut [PageInfo]) -> bool {
        false
    }
}

/// The waterfall, in priority order
pub static STRATEGIES: [&dyn NavStrategy; 8] = [
    &StandardNav,
    &DepthClass,
    &DataAttribute,
    &MegaMenu,
    &FrameworkNav,
    &PanelById,
    &PanelByFragment,
    &HeaderScan,
];

static ANY_ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid anchor selector"));

static SUBLIST: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("ul, ol, .dropdown-menu, .sub-menu, .submenu").expect("valid sublist selector")
});

/// Returns the first anchor of `item` that is not inside a nested element matching `nested`
pub(crate) fn own_anchor<'a>(item: ElementRef<'a>, nested: &Selector) -> Option<ElementRef<'a>> {
    if item.value().name() == "a" {
        return Some(item);
    }

    item.select(&ANY_ANCHOR).find(|anchor| {
        !anchor
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take_while(|ancestor| ancestor.id() != item.id())
            .any(|ancestor| nested.matches(&ancestor))
    })
}

/// Item elements of a list: its `li` children, or its direct anchors for div-style dropdowns
fn list_items(list: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let items: Vec<_> = html::children_named(list, "li").collect();
    if !items.is_empty() {
        return items;
    }
    html::children_named(list, "a").collect()
}

/// Reads a nested list (ul/li) into items starting at `depth`
pub(crate) fn list_tree(list: ElementRef<'_>, depth: u32, collector: &mut NavCollector<'_>) -> Vec<PageInfo> {
    let mut items = Vec::new();

    for item in list_items(list) {
        let label_source = own_anchor(item, &SUBLIST).unwrap_or(item);
        let href = label_source.value().attr("href");
        let label = if label_source.value().name() == "a" {
            element_label(label_source)
        } else {
            own_text(item)
        };

        let sublist = (depth < MAX_NAV_DEPTH)
            .then(|| item.select(&SUBLIST).next())
            .flatten();

        let Some(page) = collector.accept(href, &label, depth) else {
            continue;
        };

        let children = sublist
            .map(|sub| list_tree(sub, depth + 1, collector))
            .unwrap_or_default();

        if page.has_url() || !children.is_empty() || depth == 1 {
            items.push(page.with_children(children));
        }
    }

    items
}

/// Text of an element's direct text children
fn own_text(element: ElementRef<'_>) -> String {
    let text: String = element
        .children()
        .filter_map(|node| node.value().as_text().map(|t| t.to_string()))
        .collect();
    html::clean_text(&text)
}

/// Standard navigation containers holding up to three nested list levels
pub struct StandardNav;

impl NavStrategy for StandardNav {
    fn name(&self) -> &'static str {
        "standard-nav"
    }

    fn extract(&self, document: &Html, base_url: &Url) -> Vec<PageInfo> {
        let Some(containers) = html::selector(NAV_CONTAINERS) else {
            return Vec::new();
        };

        for container in document.select(&containers) {
            let list = if matches!(container.value().name(), "ul" | "ol") {
                Some(container)
            } else {
                html::selector("ul, ol").and_then(|s| container.select(&s).next())
            };
            let Some(list) = list else {
                continue;
            };

            let mut collector = NavCollector::new(base_url);
            let items = list_tree(list, 1, &mut collector);
            if !items.is_empty() {
                return items;
            }
        }

        Vec::new()
    }
}

const LEVEL_CLASSES: [&str; 3] = [
    "[class*='depth1'], [class*='dep1'], [class*='1depth'], [class*='depth_1'], [class*='depth-1']",
    "[class*='depth2'], [class*='dep2'], [class*='2depth'], [class*='depth_2'], [class*='depth-2']",
    "[class*='depth3'], [class*='dep3'], [class*='3depth'], [class*='depth_3'], [class*='depth-3']",
];

/// Containers whose class names spell out the menu level (`depth1`, `dep2`, `1depth`)
pub struct DepthClass;

impl DepthClass {
    fn level_items<'a>(scope: ElementRef<'a>, level: &Selector, nested: Option<&Selector>) -> Vec<ElementRef<'a>> {
        let mut items: Vec<ElementRef<'a>> = Vec::new();
        for element in scope.select(level) {
            if items
                .iter()
                .any(|seen| element.ancestors().any(|a| a.id() == seen.id()))
            {
                continue;
            }
            items.extend(Self::expand(element, nested));
        }
        items
    }

    /// Splits a level container into its items
    fn expand<'a>(element: ElementRef<'a>, nested: Option<&Selector>) -> Vec<ElementRef<'a>> {
        if matches!(element.value().name(), "ul" | "ol") {
            return list_items(element);
        }
        if element.value().name() != "li" {
            let inner_list = html::child_elements(element).find(|child| {
                matches!(child.value().name(), "ul" | "ol") && !nested.is_some_and(|n| n.matches(child))
            });
            if let Some(list) = inner_list {
                return list_items(list);
            }
        }

        let has_nested_level = nested.is_some_and(|n| element.select(n).next().is_some());
        let anchors: Vec<_> = element.select(&ANY_ANCHOR).collect();
        if !has_nested_level && anchors.len() > 1 {
            anchors
        } else {
            vec![element]
        }
    }

    fn build(
        scope: ElementRef<'_>,
        level: usize,
        levels: &[Selector],
        collector: &mut NavCollector<'_>,
    ) -> Vec<PageInfo> {
        let depth = level as u32 + 1;
        let nested = levels.get(level + 1);
        let mut pages = Vec::new();

        for item in Self::level_items(scope, &levels[level], nested) {
            let anchor = match nested {
                Some(nested) => own_anchor(item, nested),
                None => own_anchor(item, &SUBLIST),
            };
            let Some(anchor) = anchor else {
                continue;
            };
            let Some(page) = collector.accept_element(anchor, depth) else {
                continue;
            };

            let children = match nested {
                Some(_) if level + 1 < levels.len() => Self::build(item, level + 1, levels, collector),
                _ => Vec::new(),
            };
            pages.push(page.with_children(children));
        }

        pages
    }
}

impl NavStrategy for DepthClass {
    fn name(&self) -> &'static str {
        "depth-class"
    }

    fn extract(&self, document: &Html, base_url: &Url) -> Vec<PageInfo> {
        let levels: Vec<Selector> = LEVEL_CLASSES.iter().filter_map(|css| html::selector(css)).collect();
        if levels.len() != LEVEL_CLASSES.len() {
            return Vec::new();
        }

        let mut collector = NavCollector::new(base_url);
        Self::build(html::body(document), 0, &levels, &mut collector)
    }
}

/// Menu items tagged with `data-depth`, `data-level` or `data-menu-depth`
pub struct DataAttribute;

impl NavStrategy for DataAttribute {
    fn name(&self) -> &'static str {
        "data-attribute"
    }

    fn extract(&self, document: &Html, base_url: &Url) -> Vec<PageInfo> {
        let Some(tagged) = html::selector("[data-depth], [data-level], [data-menu-depth]") else {
            return Vec::new();
        };

        let mut collector = NavCollector::new(base_url);
        let mut roots: Vec<PageInfo> = Vec::new();

        for element in document.select(&tagged) {
            let value = element.value();
            let Some(depth) = value
                .attr("data-depth")
                .or_else(|| value.attr("data-level"))
                .or_else(|| value.attr("data-menu-depth"))
                .and_then(|d| d.trim().parse::<u32>().ok())
                .filter(|d| (1..=MAX_NAV_DEPTH).contains(d))
            else {
                continue;
            };

            let Some(anchor) = own_anchor(element, &tagged) else {
                continue;
            };

            // A nested item needs a parent at the level above it
            let has_parent = match depth {
                1 => true,
                2 => !roots.is_empty(),
                _ => roots.last().is_some_and(|root| !root.children.is_empty()),
            };
            if !has_parent {
                continue;
            }

            let Some(page) = collector.accept_element(anchor, depth) else {
                continue;
            };
            match depth {
                1 => roots.push(page),
                2 => {
                    if let Some(root) = roots.last_mut() {
                        root.children.push(page);
                    }
                }
                _ => {
                    if let Some(sub) = roots.last_mut().and_then(|r| r.children.last_mut()) {
                        sub.children.push(page);
                    }
                }
            }
        }

        roots
    }
}

const MEGA_MENU_CONTAINERS: &str = ".mega-menu, .megamenu, .mega_menu, .all-menu, .allmenu, \
     #allmenu, #all_menu, .flyout, .full-menu, #sitemap, .sitemap";

const SECTION_HEADINGS: &str = "h2, h3, h4, h5, dt, strong";

/// Mega-menu and flyout panels whose sections are grouped under headings
pub struct MegaMenu;

impl MegaMenu {
    fn section_links<'a>(heading: ElementRef<'a>, headings: &Selector) -> Vec<ElementRef<'a>> {
        let mut links: Vec<ElementRef<'a>> = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .take_while(|sibling| !headings.matches(sibling))
            .flat_map(|sibling| {
                if sibling.value().name() == "a" {
                    vec![sibling]
                } else {
                    sibling.select(&ANY_ANCHOR).collect()
                }
            })
            .collect();

        // Heading wrapped alone in its section element: take the section's other links
        if links.is_empty() {
            if let Some(section) = heading.parent().and_then(ElementRef::wrap) {
                if section.select(headings).count() == 1 {
                    links = section
                        .select(&ANY_ANCHOR)
                        .filter(|a| !a.ancestors().any(|anc| anc.id() == heading.id()))
                        .collect();
                }
            }
        }

        links
    }
}

impl NavStrategy for MegaMenu {
    fn name(&self) -> &'static str {
        "mega-menu"
    }

    fn extract(&self, document: &Html, base_url: &Url) -> Vec<PageInfo> {
        let (Some(containers), Some(headings)) =
            (html::selector(MEGA_MENU_CONTAINERS), html::selector(SECTION_HEADINGS))
        else {
            return Vec::new();
        };

        for container in document.select(&containers) {
            let mut collector = NavCollector::new(base_url);
            let mut roots = Vec::new();

            for heading in container.select(&headings) {
                let anchor = own_anchor(heading, &SUBLIST);
                let href = anchor.and_then(|a| a.value().attr("href"));
                let Some(root) = collector.accept(href, &element_label(heading), 1) else {
                    continue;
                };

                let children: Vec<PageInfo> = Self::section_links(heading, &headings)
                    .into_iter()
                    .filter_map(|link| collector.accept_element(link, 2))
                    .collect();

                if root.has_url() || !children.is_empty() {
                    roots.push(root.with_children(children));
                }
            }

            if !roots.is_empty() {
                return roots;
            }
        }

        Vec::new()
    }
}

const FRAMEWORK_MENUS: &[&str] = &[
    ".navbar-nav",
    "ul.menu-nav",
    "ul[id^='menu-']",
    ".menu-main-container > ul",
    "ul.wp-block-navigation__container",
];

/// Framework navigation components (Bootstrap navbars, WordPress menus)
pub struct FrameworkNav;

impl NavStrategy for FrameworkNav {
    fn name(&self) -> &'static str {
        "framework"
    }

    fn extract(&self, document: &Html, base_url: &Url) -> Vec<PageInfo> {
        for css in FRAMEWORK_MENUS {
            let Some(menu) = html::select_first(document, css) else {
                continue;
            };

            let mut collector = NavCollector::new(base_url);
            let items = list_tree(menu, 1, &mut collector);
            if !items.is_empty() {
                return items;
            }
        }

        // WordPress themes without a recognizable container still tag items
        if let Some(item) = html::select_first(document, "li.menu-item") {
            if let Some(menu) = item.parent().and_then(ElementRef::wrap) {
                let mut collector = NavCollector::new(base_url);
                return list_tree(menu, 1, &mut collector);
            }
        }

        Vec::new()
    }
}

const HEADER_REGIONS: &str = "header, #header, .header, #hd, #top, .top_area";

const HEADER_EXCLUDES: &[&str] = &[
    "login", "logout", "join", "register", "member", "search", "mypage", "로그인", "로그아웃",
    "회원가입", "회원", "검색", "마이페이지",
];

/// Last resort: every anchor in the header region except account and search links
pub struct HeaderScan;

impl NavStrategy for HeaderScan {
    fn name(&self) -> &'static str {
        "header-scan"
    }

    fn extract(&self, document: &Html, base_url: &Url) -> Vec<PageInfo> {
        let Some(header) = html::select_first(document, HEADER_REGIONS) else {
            return Vec::new();
        };

        let homepage = resolve_href(base_url.as_str(), base_url);
        let mut collector = NavCollector::with_seen(base_url, homepage);

        header
            .select(&html::LINK_SELECTOR)
            .filter(|anchor| {
                let href = anchor.value().attr("href").unwrap_or("").to_lowercase();
                let text = html::element_text(*anchor).to_lowercase();
                !HEADER_EXCLUDES
                    .iter()
                    .any(|needle| href.contains(needle) || text.contains(needle))
            })
            .filter_map(|anchor| collector.accept_element(anchor, 1))
            .filter(|page| page.has_url())
            .collect()
    }
}
