use crate::state::{DictionaryEntry, EntryCategory, TaxonomyNode};
use std::collections::HashSet;

/// Subcategory name used for entries that have none
pub const GENERAL_SUBCATEGORY: &str = "general";

/// Accumulates dictionary entries for one crawl
///
/// Entries are unique by (term, category); the first one wins and keeps
/// its position.
#[derive(Debug, Default)]
pub struct DictionaryBuilder {
    entries: Vec<DictionaryEntry>,
    keys: HashSet<(String, EntryCategory)>,
}

impl DictionaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, returning false if its (term, category) is already present
    pub fn add(&mut self, entry: DictionaryEntry) -> bool {
        let term = entry.term.trim();
        if term.is_empty() {
            return false;
        }

        if !self.keys.insert((term.to_string(), entry.category)) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Adds every entry, returning how many were new
    pub fn extend(&mut self, entries: impl IntoIterator<Item = DictionaryEntry>) -> usize {
        entries.into_iter().map(|e| self.add(e)).filter(|added| *added).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<DictionaryEntry> {
        self.entries
    }
}

/// Derives a category → subcategory → term taxonomy from dictionary entries
///
/// Categories follow `EntryCategory::all()` order; subcategories and terms
/// keep first-seen order.
pub fn derive_taxonomy(entries: &[DictionaryEntry]) -> Vec<TaxonomyNode> {
    EntryCategory::all()
        .into_iter()
        .filter_map(|category| {
            let mut subcategories: Vec<TaxonomyNode> = Vec::new();

            for entry in entries.iter().filter(|e| e.category == category) {
                let name = entry.subcategory.as_deref().unwrap_or(GENERAL_SUBCATEGORY);
                let position = match subcategories.iter().position(|node| node.name == name) {
                    Some(position) => position,
                    None => {
                        subcategories.push(TaxonomyNode {
                            name: name.to_string(),
                            children: Vec::new(),
                        });
                        subcategories.len() - 1
                    }
                };
                subcategories[position].children.push(TaxonomyNode {
                    name: entry.term.clone(),
                    children: Vec::new(),
                });
            }

            (!subcategories.is_empty()).then(|| TaxonomyNode {
                name: category.to_db_string().to_string(),
                children: subcategories,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_by_term_and_category() {
        let mut builder = DictionaryBuilder::new();
        assert!(builder.add(DictionaryEntry::new("청년부", EntryCategory::Department)));
        assert!(!builder.add(DictionaryEntry::new("청년부", EntryCategory::Department).with_subcategory("youth")));
        assert!(builder.add(DictionaryEntry::new("청년부", EntryCategory::Program)));
        assert!(!builder.add(DictionaryEntry::new("  ", EntryCategory::Person)));

        assert_eq!(builder.len(), 2);
        assert!(builder.entries()[0].subcategory.is_none());
    }

    #[test]
    fn test_extend_counts_new_entries() {
        let mut builder = DictionaryBuilder::new();
        let added = builder.extend(vec![
            DictionaryEntry::new("a", EntryCategory::Place),
            DictionaryEntry::new("a", EntryCategory::Place),
            DictionaryEntry::new("b", EntryCategory::Place),
        ]);
        assert_eq!(added, 2);
    }

    #[test]
    fn test_derive_taxonomy() {
        let entries = vec![
            DictionaryEntry::new("국제선교부", EntryCategory::Department).with_subcategory("mission"),
            DictionaryEntry::new("김철수", EntryCategory::Person).with_subcategory("pastor"),
            DictionaryEntry::new("청년부", EntryCategory::Department).with_subcategory("youth"),
            DictionaryEntry::new("사랑부", EntryCategory::Department),
        ];
        let taxonomy = derive_taxonomy(&entries);

        assert_eq!(taxonomy.len(), 2);
        assert_eq!(taxonomy[0].name, "person");
        assert_eq!(taxonomy[1].name, "department");

        let subcategories: Vec<_> = taxonomy[1].children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(subcategories, vec!["mission", "youth", "general"]);
        assert_eq!(taxonomy[1].children[0].children[0].name, "국제선교부");
    }

    #[test]
    fn test_empty_dictionary_has_no_taxonomy() {
        assert!(derive_taxonomy(&[]).is_empty());
    }
}
