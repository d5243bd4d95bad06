//! URL-keyed page arena
//!
//! Pages discovered during a crawl live in a flat vector; parent/child links
//! are index lists. A URL occupies at most one position: the first insert
//! wins and later inserts of the same URL are rejected. The nested
//! `PageInfo` tree is only materialized when the crawl result is assembled.

use crate::state::site::PageInfo;
use std::collections::HashMap;

/// Index of a page inside a `PageArena`
pub type PageId = usize;

#[derive(Debug, Clone)]
struct PageNode {
    info: PageInfo,
    children: Vec<PageId>,
}

/// Flat storage for the pages of one crawl
#[derive(Debug, Default)]
pub struct PageArena {
    nodes: Vec<PageNode>,
    by_url: HashMap<String, PageId>,
}

impl PageArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.by_url.contains_key(url)
    }

    pub fn id_of(&self, url: &str) -> Option<PageId> {
        self.by_url.get(url).copied()
    }

    pub fn get(&self, id: PageId) -> Option<&PageInfo> {
        self.nodes.get(id).map(|node| &node.info)
    }

    pub fn get_mut(&mut self, id: PageId) -> Option<&mut PageInfo> {
        self.nodes.get_mut(id).map(|node| &mut node.info)
    }

    pub fn children_of(&self, id: PageId) -> &[PageId] {
        self.nodes.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// Inserts a root page at the depth it already carries
    ///
    /// Any nested children on `info` are discarded; use `insert_tree` to keep them.
    /// Returns None if the URL is already present.
    pub fn insert_root(&mut self, mut info: PageInfo) -> Option<PageId> {
        info.children.clear();
        info.parent_url = None;
        self.push(info, None)
    }

    /// Inserts a page under `parent`, forcing `depth = parent.depth + 1`
    ///
    /// Returns None if the URL is already present or the parent is unknown.
    pub fn insert_child(&mut self, parent: PageId, mut info: PageInfo) -> Option<PageId> {
        let parent_info = self.get(parent)?;
        info.depth = parent_info.depth + 1;
        info.parent_url = parent_info.has_url().then(|| parent_info.url.clone());
        info.children.clear();
        self.push(info, Some(parent))
    }

    /// Flattens a nested tree into the arena, returning the ids of the inserted roots
    ///
    /// Duplicate nodes are dropped together with their subtrees.
    pub fn insert_tree(&mut self, roots: Vec<PageInfo>) -> Vec<PageId> {
        let mut inserted = Vec::new();
        for mut root in roots {
            let children = std::mem::take(&mut root.children);
            if let Some(id) = self.insert_root(root) {
                self.insert_subtree(id, children);
                inserted.push(id);
            }
        }
        inserted
    }

    fn insert_subtree(&mut self, parent: PageId, children: Vec<PageInfo>) {
        for mut child in children {
            let grandchildren = std::mem::take(&mut child.children);
            if let Some(id) = self.insert_child(parent, child) {
                self.insert_subtree(id, grandchildren);
            }
        }
    }

    /// Returns the ids of `roots` and all their descendants in breadth-first order
    pub fn breadth_first(&self, roots: &[PageId]) -> Vec<PageId> {
        let mut order = Vec::new();
        let mut queue: std::collections::VecDeque<PageId> = roots.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.children_of(id).iter().copied());
        }
        order
    }

    /// Rebuilds the nested `PageInfo` tree below the given roots
    pub fn materialize(&self, roots: &[PageId]) -> Vec<PageInfo> {
        roots.iter().filter_map(|&id| self.materialize_node(id)).collect()
    }

    fn materialize_node(&self, id: PageId) -> Option<PageInfo> {
        let node = self.nodes.get(id)?;
        let mut info = node.info.clone();
        info.children = self.materialize(&node.children);
        Some(info)
    }

    fn push(&mut self, info: PageInfo, parent: Option<PageId>) -> Option<PageId> {
        if info.has_url() && self.by_url.contains_key(&info.url) {
            return None;
        }

        let id = self.nodes.len();
        if info.has_url() {
            self.by_url.insert(info.url.clone(), id);
        }
        self.nodes.push(PageNode {
            info,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PageType;

    fn page(url: &str, depth: u32) -> PageInfo {
        PageInfo::new(url, url, PageType::for_menu_depth(depth), depth)
    }

    #[test]
    fn test_insert_tree_and_materialize() {
        let mut arena = PageArena::new();
        let roots = arena.insert_tree(vec![page("/a", 1)
            .with_children(vec![page("/a/1", 2), page("/a/2", 2)])]);

        let tree = arena.materialize(&roots);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].depth, 2);
        assert_eq!(tree[0].children[0].parent_url.as_deref(), Some("/a"));
    }

    #[test]
    fn test_duplicate_url_rejected() {
        let mut arena = PageArena::new();
        let first = arena.insert_root(page("/a", 1));
        let second = arena.insert_root(page("/a", 1));
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_child_depth_is_forced() {
        let mut arena = PageArena::new();
        let root = arena.insert_root(page("/a", 1)).unwrap();
        let child = arena.insert_child(root, page("/a/x", 7)).unwrap();
        assert_eq!(arena.get(child).unwrap().depth, 2);
    }

    #[test]
    fn test_empty_urls_are_never_deduplicated() {
        let mut arena = PageArena::new();
        assert!(arena.insert_root(page("", 1)).is_some());
        assert!(arena.insert_root(page("", 1)).is_some());
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_breadth_first_order() {
        let mut arena = PageArena::new();
        let roots = arena.insert_tree(vec![
            page("/a", 1).with_children(vec![page("/a/1", 2)]),
            page("/b", 1),
        ]);
        let order: Vec<_> = arena
            .breadth_first(&roots)
            .into_iter()
            .map(|id| arena.get(id).unwrap().url.clone())
            .collect();
        assert_eq!(order, vec!["/a", "/b", "/a/1"]);
    }
}
