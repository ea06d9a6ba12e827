use chrono::{DateTime, Utc};

use crate::app::{FeedError, Result};
use crate::domain::FeedItem;
use crate::feed::dedup::Deduplicator;
use crate::feed::pager::Pager;

/// State of a single page view of the feed.
///
/// Created empty, populated once from the resolved source, and thrown away on
/// reload. The `generation` distinguishes one session from the next.
#[derive(Debug)]
pub struct FeedSession {
    generation: u64,
    started_at: DateTime<Utc>,
    source_url: Option<String>,
    resolved: bool,
    failed: bool,
    pager: Pager,
    seen: Deduplicator,
}

impl FeedSession {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            started_at: Utc::now(),
            source_url: None,
            resolved: false,
            failed: false,
            pager: Pager::default(),
            seen: Deduplicator::new(),
        }
    }

    /// Fills the session from a resolved source. Duplicates are dropped here.
    pub fn populate(&mut self, source_url: String, items: Vec<FeedItem>) -> Result<()> {
        if self.resolved {
            return Err(FeedError::InvalidArgument(
                "feed session is already populated".into(),
            ));
        }
        let items = self.seen.dedup(items);
        tracing::info!("Session {} holds {} items from {}", self.generation, items.len(), source_url);
        self.source_url = Some(source_url);
        self.pager = Pager::new(items);
        self.resolved = true;
        Ok(())
    }

    /// Marks the source as irrecoverably failed.
    pub fn fail(&mut self) {
        self.resolved = true;
        self.failed = true;
        self.pager.exhaust();
    }

    pub fn next_page(&mut self, page_size: usize) -> Result<&[FeedItem]> {
        self.pager.next_page(page_size)
    }

    /// Admits an item added outside the resolved source; false if its id is taken.
    pub fn admit(&mut self, item: &FeedItem) -> bool {
        self.seen.admit(item)
    }

    pub fn forget(&mut self, id: &str) -> bool {
        self.seen.forget(id)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    pub fn all_items(&self) -> &[FeedItem] {
        self.pager.items()
    }

    pub fn cursor(&self) -> usize {
        self.pager.cursor()
    }

    pub fn remaining(&self) -> usize {
        self.pager.remaining()
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    pub fn is_exhausted(&self) -> bool {
        self.pager.is_exhausted()
    }
}
