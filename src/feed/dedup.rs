use std::collections::HashSet;

use crate::domain::FeedItem;

/// Tracks the ids already admitted into a feed session.
#[derive(Debug, Default, Clone)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the item's id; returns false if it was already seen.
    pub fn admit(&mut self, item: &FeedItem) -> bool {
        self.seen.insert(item.id().to_string())
    }

    /// Filters `items` down to first occurrences, keeping their relative order.
    pub fn dedup(&mut self, items: Vec<FeedItem>) -> Vec<FeedItem> {
        let before = items.len();
        let unique: Vec<FeedItem> = items.into_iter().filter(|item| self.admit(item)).collect();
        if unique.len() < before {
            tracing::debug!("Dropped {} duplicate items", before - unique.len());
        }
        unique
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn forget(&mut self, id: &str) -> bool {
        self.seen.remove(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// One-shot deduplication with a fresh seen set.
pub fn dedup(items: Vec<FeedItem>) -> Vec<FeedItem> {
    Deduplicator::new().dedup(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemKind;

    fn link(url: &str, title: &str) -> FeedItem {
        FeedItem::builder(ItemKind::LinkCard)
            .url(url)
            .title(title)
            .build()
            .unwrap()
    }

    fn ids(items: &[FeedItem]) -> Vec<&str> {
        items.iter().map(|i| i.id()).collect()
    }

    #[test]
    fn test_same_url_keeps_first() {
        let items = vec![
            link("https://example.com/a", "First"),
            link("https://example.com/b", "Other"),
            link("https://example.com/a", "Second"),
        ];
        let unique = dedup(items);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title(), "First");
        assert_eq!(ids(&unique), vec!["https://example.com/a", "https://example.com/b"]);
    }

    #[test]
    fn test_order_is_stable() {
        let items = vec![
            link("https://example.com/3", "3"),
            link("https://example.com/1", "1"),
            link("https://example.com/3", "3 again"),
            link("https://example.com/2", "2"),
            link("https://example.com/1", "1 again"),
        ];
        let unique = dedup(items);
        assert_eq!(
            ids(&unique),
            vec![
                "https://example.com/3",
                "https://example.com/1",
                "https://example.com/2"
            ]
        );
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let items = vec![
            link("https://example.com/a", "A"),
            link("https://example.com/a", "A2"),
            link("https://example.com/b", "B"),
        ];
        let once = dedup(items);
        let twice = dedup(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_seen_set_persists_across_batches() {
        let mut dedup = Deduplicator::new();
        let first = dedup.dedup(vec![link("https://example.com/a", "A")]);
        assert_eq!(first.len(), 1);

        let second = dedup.dedup(vec![
            link("https://example.com/a", "A again"),
            link("https://example.com/c", "C"),
        ]);
        assert_eq!(ids(&second), vec!["https://example.com/c"]);
        assert_eq!(dedup.len(), 2);

        assert!(dedup.forget("https://example.com/a"));
        assert!(!dedup.contains("https://example.com/a"));
        assert!(dedup.admit(&link("https://example.com/a", "A back")));
    }
}
