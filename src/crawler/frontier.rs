//! Work queue for the deep crawl
//!
//! This module handles:
//! - The FIFO queue of arena pages waiting to be fetched
//! - The crawl-wide visited set
//! - The cumulative page budget shared by the navigation and popup phases
//! - The inclusive depth ceiling

use crate::state::{PageId, PageInfo};
use crate::url::is_same_domain;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Why a dequeued page is not fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyVisited,
    TooDeep,
    MissingUrl,
    CrossDomain,
    Unfetchable,
    BudgetExhausted,
}

/// Outcome of checking a page against the frontier's rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The page was marked visited and counted against the budget
    Fetch,
    Skip(SkipReason),
}

/// FIFO queue, visited set and page budget of one crawl
#[derive(Debug)]
pub struct Frontier {
    base_url: Url,
    queue: VecDeque<PageId>,
    visited: HashSet<String>,
    fetched: usize,
    max_pages: usize,
    max_depth: u32,
}

impl Frontier {
    pub fn new(base_url: Url, max_depth: u32, max_pages: usize) -> Self {
        Self {
            base_url,
            queue: VecDeque::new(),
            visited: HashSet::new(),
            fetched: 0,
            max_pages,
            max_depth,
        }
    }

    /// Marks URLs fetched outside the queue (homepage, entry hops) as visited
    ///
    /// These do not count against the page budget.
    pub fn mark_visited(&mut self, urls: impl IntoIterator<Item = String>) {
        self.visited.extend(urls);
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn push(&mut self, id: PageId) {
        self.queue.push_back(id);
    }

    pub fn extend(&mut self, ids: impl IntoIterator<Item = PageId>) {
        self.queue.extend(ids);
    }

    /// Next page to consider, None once the queue drains or the budget is spent
    pub fn pop(&mut self) -> Option<PageId> {
        if self.budget_exhausted() {
            return None;
        }
        self.queue.pop_front()
    }

    /// Checks a page and, if it may be fetched, marks it visited and counts it
    pub fn admit(&mut self, page: &PageInfo) -> Admission {
        let reason = if !page.has_url() {
            Some(SkipReason::MissingUrl)
        } else if self.visited.contains(&page.url) {
            Some(SkipReason::AlreadyVisited)
        } else if page.depth > self.max_depth {
            Some(SkipReason::TooDeep)
        } else if page.page_type.is_unfetchable() {
            Some(SkipReason::Unfetchable)
        } else if !is_same_domain(&page.url, &self.base_url) {
            Some(SkipReason::CrossDomain)
        } else if self.budget_exhausted() {
            Some(SkipReason::BudgetExhausted)
        } else {
            None
        };

        match reason {
            Some(reason) => Admission::Skip(reason),
            None => {
                self.visited.insert(page.url.clone());
                self.fetched += 1;
                Admission::Fetch
            }
        }
    }

    /// Returns true if children of a page at `depth` may be enqueued
    pub fn can_descend(&self, depth: u32) -> bool {
        depth < self.max_depth
    }

    pub fn budget_exhausted(&self) -> bool {
        self.fetched >= self.max_pages
    }

    /// Pages admitted so far across both phases
    pub fn fetched(&self) -> usize {
        self.fetched
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
