use crate::app::{FeedError, Result};
use crate::domain::FeedItem;

/// Serves fixed-size pages from a deduplicated item sequence.
#[derive(Debug, Default, Clone)]
pub struct Pager {
    items: Vec<FeedItem>,
    cursor: usize,
    exhausted: bool,
}

impl Pager {
    pub fn new(items: Vec<FeedItem>) -> Self {
        Self {
            items,
            cursor: 0,
            exhausted: false,
        }
    }

    /// Returns up to `page_size` items from the cursor and advances past them.
    ///
    /// Once exhausted, every call returns an empty slice and changes nothing.
    pub fn next_page(&mut self, page_size: usize) -> Result<&[FeedItem]> {
        if page_size == 0 {
            tracing::error!("next_page called with a page size of zero");
            return Err(FeedError::InvalidArgument(
                "page size must be a positive integer".into(),
            ));
        }

        if self.exhausted {
            return Ok(&[]);
        }

        let start = self.cursor;
        let end = (start + page_size).min(self.items.len());
        self.cursor = end;

        if end - start < page_size && self.cursor >= self.items.len() {
            self.exhausted = true;
        }

        Ok(&self.items[start..end])
    }

    /// Marks the sequence as finished without consuming it.
    pub fn exhaust(&mut self) {
        self.exhausted = true;
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.items.len() - self.cursor
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
