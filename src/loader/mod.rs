//! Viewport-driven incremental loading.
//!
//! A [`Loader`] owns one [`FeedSession`] at a time. The first visibility
//! signal resolves the source and every signal after that appends one page.
//! Signals that arrive while a page is loading are dropped, not queued.

pub mod surface;
pub mod viewport;

pub use surface::{FeedSurface, HtmlSurface, Sentinel};
pub use viewport::{Subscription, Viewport, VisibilitySignal};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::app::{AppContext, FeedError, Result};
use crate::domain::FeedItem;
use crate::feed::FeedSession;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::render::Renderer;
use crate::resolver::SourceResolver;

pub const STATUS_LOADING: &str = "Loading…";
pub const STATUS_MORE: &str = "Scroll for more…";
pub const STATUS_DONE: &str = "Up to date.";
pub const STATUS_FALLBACK: &str = "Live feed unavailable. Showing fallback.";
pub const STATUS_UNAVAILABLE: &str = "Feed not available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderState {
    Idle,
    Loading,
    /// Internal only. Held while fallback content is put up, then replaced
    /// by `Exhausted` before control returns; callers see the failure through
    /// `LoaderStatus::failed` and `LoaderStatus::last_error`.
    Error,
    Exhausted,
}

impl LoaderState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoaderState::Error | LoaderState::Exhausted)
    }
}

/// What handling one signal did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Page { rendered: usize, exhausted: bool },
    Exhausted,
    /// No source could be loaded.
    Failed,
    /// A load was already in flight.
    Dropped,
    /// The signal belonged to an earlier session.
    Stale,
    /// The loader had already stopped.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Prepend,
    Append,
}

/// Snapshot of the loader, also used as a heartbeat.
#[derive(Debug, Clone, Serialize)]
pub struct LoaderStatus {
    pub state: LoaderState,
    pub generation: u64,
    pub started_at: DateTime<Utc>,
    pub source_url: Option<String>,
    pub cursor: usize,
    pub total: usize,
    pub rendered: usize,
    pub pages_requested: usize,
    pub dropped_signals: usize,
    pub failed: bool,
    pub last_error: Option<String>,
    pub observing: bool,
}

pub struct Loader<S: FeedSurface> {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    resolver: SourceResolver,
    normalizer: Normalizer,
    renderer: Renderer,
    surface: S,
    viewport: Viewport,
    subscription: Option<Subscription>,
    session: FeedSession,
    state: LoaderState,
    page_size: usize,
    skeleton_count: usize,
    fallback_video_ids: Vec<String>,
    rendered: usize,
    pages_requested: usize,
    dropped_signals: usize,
    last_error: Option<String>,
}

impl<S: FeedSurface> Loader<S> {
    pub fn new(ctx: &AppContext, surface: S, viewport: Viewport) -> Result<Self> {
        let feed = &ctx.config.feed;
        if feed.page_size == 0 {
            return Err(FeedError::InvalidArgument(
                "page size must be at least 1".into(),
            ));
        }

        Ok(Self {
            fetcher: ctx.fetcher.clone(),
            resolver: ctx.resolver.clone(),
            normalizer: ctx.normalizer.clone(),
            renderer: ctx.renderer.clone(),
            surface,
            viewport,
            subscription: None,
            session: FeedSession::new(1),
            state: LoaderState::Idle,
            page_size: feed.page_size,
            skeleton_count: feed.skeleton_count,
            fallback_video_ids: feed.fallback_video_ids.clone(),
            rendered: 0,
            pages_requested: 0,
            dropped_signals: 0,
            last_error: None,
        })
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn session(&self) -> &FeedSession {
        &self.session
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Observes the sentinel and loads the first page.
    pub async fn start(&mut self) -> LoadOutcome {
        self.observe();
        self.load_page().await
    }

    /// Attaches the sentinel and starts observing it without loading anything.
    pub fn observe(&mut self) {
        let sentinel = self.surface.attach_sentinel();
        self.subscription = Some(
            self.viewport
                .subscribe(&sentinel, self.session.generation()),
        );
    }

    pub async fn handle_signal(&mut self, signal: VisibilitySignal) -> LoadOutcome {
        if signal.generation != self.session.generation() {
            tracing::debug!(
                "Ignoring signal from session {} (current {})",
                signal.generation,
                self.session.generation()
            );
            return LoadOutcome::Stale;
        }
        self.trigger().await
    }

    /// Loads the next page if the loader is idle.
    pub async fn trigger(&mut self) -> LoadOutcome {
        match self.state {
            LoaderState::Idle => self.load_page().await,
            LoaderState::Loading => {
                self.dropped_signals += 1;
                LoadOutcome::Dropped
            }
            LoaderState::Error | LoaderState::Exhausted => LoadOutcome::Finished,
        }
    }

    /// Handles signals until the feed is exhausted or the channel closes.
    pub async fn run(&mut self, signals: &mut mpsc::UnboundedReceiver<VisibilitySignal>) {
        while !self.state.is_terminal() {
            let Some(signal) = signals.recv().await else {
                break;
            };

            let dropped = {
                let load = self.handle_signal(signal);
                tokio::pin!(load);
                let mut dropped = 0;
                loop {
                    tokio::select! {
                        biased;
                        _ = &mut load => break,
                        Some(extra) = signals.recv() => {
                            tracing::debug!(
                                "Dropped signal for session {} while loading",
                                extra.generation
                            );
                            dropped += 1;
                        }
                    }
                }
                // Signals that became ready in the same wakeup as the load
                // still arrived while it was in flight.
                while let Ok(extra) = signals.try_recv() {
                    tracing::debug!(
                        "Dropped signal for session {} while loading",
                        extra.generation
                    );
                    dropped += 1;
                }
                dropped
            };
            self.dropped_signals += dropped;
        }
    }

    /// Throws the session away and starts over from source resolution.
    pub async fn reload(&mut self) -> LoadOutcome {
        let generation = self.session.generation() + 1;
        tracing::info!("Reloading feed as session {}", generation);

        self.stop_observing();
        self.session = FeedSession::new(generation);
        self.surface.clear();
        self.state = LoaderState::Idle;
        self.rendered = 0;
        self.pages_requested = 0;
        self.dropped_signals = 0;
        self.last_error = None;

        self.start().await
    }

    /// Adds an item outside the paging flow. Rejected if its id was already seen.
    pub fn inject(&mut self, item: FeedItem, placement: Placement) -> bool {
        if !self.session.admit(&item) {
            tracing::debug!("Not injecting {}: already in the feed", item.id());
            return false;
        }

        let card = self.renderer.render(&item);
        match placement {
            Placement::Prepend => self.surface.prepend(item.id(), card),
            Placement::Append => self.surface.append(item.id(), card),
        }
        self.rendered += 1;
        true
    }

    pub fn remove(&mut self, item_id: &str) -> bool {
        if !self.surface.remove(item_id) {
            return false;
        }
        self.session.forget(item_id);
        self.rendered = self.rendered.saturating_sub(1);
        true
    }

    pub fn status(&self) -> LoaderStatus {
        LoaderStatus {
            state: self.state,
            generation: self.session.generation(),
            started_at: self.session.started_at(),
            source_url: self.session.source_url().map(str::to_string),
            cursor: self.session.cursor(),
            total: self.session.all_items().len(),
            rendered: self.rendered,
            pages_requested: self.pages_requested,
            dropped_signals: self.dropped_signals,
            failed: self.session.has_failed(),
            last_error: self.last_error.clone(),
            observing: self.subscription.is_some(),
        }
    }

    async fn load_page(&mut self) -> LoadOutcome {
        self.state = LoaderState::Loading;
        self.surface.set_status(STATUS_LOADING);
        let skeletons: Vec<_> = (0..self.skeleton_count)
            .map(|_| self.renderer.skeleton())
            .collect();
        self.surface.show_skeletons(skeletons);

        if !self.session.is_resolved() {
            if let Err(e) = self.resolve().await {
                return self.fail(e);
            }
        }

        self.pages_requested += 1;
        let page = match self.session.next_page(self.page_size) {
            Ok(page) => page.to_vec(),
            Err(e) => return self.fail(e),
        };
        self.surface.remove_skeletons();

        if page.is_empty() {
            self.finish(STATUS_DONE);
            return LoadOutcome::Exhausted;
        }

        for item in &page {
            self.surface.append(item.id(), self.renderer.render(item));
        }
        self.rendered += page.len();
        tracing::debug!(
            "Rendered {} items, {} remaining",
            page.len(),
            self.session.remaining()
        );

        if self.session.remaining() == 0 {
            self.finish(STATUS_DONE);
            return LoadOutcome::Page {
                rendered: page.len(),
                exhausted: true,
            };
        }

        self.state = LoaderState::Idle;
        self.surface.set_status(STATUS_MORE);
        LoadOutcome::Page {
            rendered: page.len(),
            exhausted: false,
        }
    }

    async fn resolve(&mut self) -> Result<()> {
        let source = self.resolver.resolve(self.fetcher.as_ref()).await?;
        let items = self.normalizer.normalize(&source.payload);
        self.session.populate(source.url, items)
    }

    fn fail(&mut self, error: FeedError) -> LoadOutcome {
        tracing::warn!("Feed load failed: {}", error);
        self.state = LoaderState::Error;
        self.last_error = Some(error.to_string());
        self.surface.remove_skeletons();
        self.session.fail();

        let status = if self.surface.is_empty() && !self.show_fallback() {
            let notice = self.renderer.unavailable_notice(self.resolver.candidates());
            self.surface.show_notice(notice);
            STATUS_UNAVAILABLE
        } else {
            STATUS_FALLBACK
        };
        self.finish(status);
        LoadOutcome::Failed
    }

    /// Renders the fallback videos. False if none could be shown.
    fn show_fallback(&mut self) -> bool {
        let items: Vec<FeedItem> = self
            .fallback_video_ids
            .iter()
            .filter_map(|id| FeedItem::youtube(id))
            .collect();

        let mut shown = 0;
        for item in items {
            if self.session.admit(&item) {
                self.surface.append(item.id(), self.renderer.render(&item));
                shown += 1;
            }
        }
        self.rendered += shown;
        shown > 0
    }

    fn finish(&mut self, status: &str) {
        tracing::info!(
            "Session {} finished with {} items rendered",
            self.session.generation(),
            self.rendered
        );
        self.state = LoaderState::Exhausted;
        self.stop_observing();
        self.surface.set_status(status);
    }

    fn stop_observing(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.surface.detach_sentinel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::ItemKind;
    use crate::test_utils::MockFetcher;
    use std::time::Duration;

    const FEED: &str = "https://site.test/content_feed.json";
    const LEGACY: &str = "https://site.test/content.json";

    fn loader_with(
        fetcher: MockFetcher,
        configure: impl FnOnce(&mut Config),
    ) -> (Loader<HtmlSurface>, Viewport, mpsc::UnboundedReceiver<VisibilitySignal>) {
        let mut config = Config::default();
        config.sources.candidates = vec![FEED.to_string(), LEGACY.to_string()];
        configure(&mut config);

        let ctx = AppContext::with_fetcher(config, Arc::new(fetcher)).unwrap();
        let surface = HtmlSurface::mount(&[], &ctx.config.feed, &ctx.config.render);
        let (viewport, rx) = Viewport::channel();
        let loader = Loader::new(&ctx, surface, viewport.clone()).unwrap();
        (loader, viewport, rx)
    }

    fn loader(
        fetcher: MockFetcher,
    ) -> (Loader<HtmlSurface>, Viewport, mpsc::UnboundedReceiver<VisibilitySignal>) {
        loader_with(fetcher, |_| {})
    }

    fn payload(count: usize) -> String {
        let items: Vec<String> = (0..count)
            .map(|i| format!(r#"{{"title": "Item {i}", "url": "https://example.com/{i}"}}"#))
            .collect();
        format!(r#"{{"items": [{}]}}"#, items.join(","))
    }

    #[tokio::test]
    async fn test_all_sources_missing_shows_fallback() {
        let fetcher = MockFetcher::new();
        let (mut loader, viewport, _rx) = loader(fetcher.clone());

        assert_eq!(loader.start().await, LoadOutcome::Failed);

        let status = loader.status();
        assert_eq!(status.state, LoaderState::Exhausted);
        assert!(status.failed);
        assert!(status.last_error.unwrap().contains("No feed source available"));
        assert_eq!(fetcher.requests(), vec![FEED, LEGACY]);

        let surface = loader.surface();
        assert_eq!(
            surface.rendered_ids(),
            vec![
                "https://www.youtube.com/watch?v=kXYiU_JCYtU",
                "https://www.youtube.com/watch?v=3YxaaGgTQYM",
                "https://www.youtube.com/watch?v=ktvTqknDobU",
            ]
        );
        assert_eq!(surface.status(), STATUS_FALLBACK);
        assert_eq!(surface.skeleton_count(), 0);
        assert!(surface.sentinel().is_none());
        assert!(!viewport.is_observing());
    }

    #[tokio::test]
    async fn test_no_fallback_ids_shows_notice() {
        let (mut loader, _viewport, _rx) =
            loader_with(MockFetcher::new(), |c| c.feed.fallback_video_ids.clear());

        assert_eq!(loader.start().await, LoadOutcome::Failed);

        let surface = loader.surface();
        assert!(surface.is_empty());
        let notice = surface.notice().unwrap();
        assert!(notice.text_content().contains("Feed not available"));
        assert!(notice.text_content().contains("content_feed.json"));
        assert_eq!(surface.status(), STATUS_UNAVAILABLE);
        assert_eq!(loader.state(), LoaderState::Exhausted);
    }

    #[tokio::test]
    async fn test_single_video_exhausts_immediately() {
        let fetcher = MockFetcher::new().with_body(
            LEGACY,
            r#"{"items": [{"title": "A", "url": "https://youtu.be/abc123XYZ"}]}"#,
        );
        let (mut loader, _viewport, _rx) = loader(fetcher.clone());

        assert_eq!(
            loader.start().await,
            LoadOutcome::Page {
                rendered: 1,
                exhausted: true
            }
        );
        assert_eq!(loader.state(), LoaderState::Exhausted);
        assert_eq!(fetcher.requests(), vec![FEED, LEGACY]);

        let surface = loader.surface();
        let cards = surface.rendered_cards();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].get_attr("data-kind"), Some(ItemKind::VideoEmbed.as_str()));
        assert!(cards[0].text_content().contains('A'));
        assert_eq!(surface.status(), STATUS_DONE);
        assert!(surface.sentinel().is_none());

        assert_eq!(loader.status().source_url.as_deref(), Some(LEGACY));
        assert!(!loader.status().failed);
    }

    #[tokio::test]
    async fn test_pages_until_exhausted() {
        let fetcher = MockFetcher::new().with_body(FEED, &payload(8));
        let (mut loader, _viewport, _rx) = loader(fetcher.clone());

        assert_eq!(
            loader.start().await,
            LoadOutcome::Page {
                rendered: 6,
                exhausted: false
            }
        );
        assert_eq!(loader.state(), LoaderState::Idle);
        assert_eq!(loader.surface().status(), STATUS_MORE);
        assert!(loader.surface().sentinel().is_some());

        assert_eq!(
            loader.trigger().await,
            LoadOutcome::Page {
                rendered: 2,
                exhausted: true
            }
        );
        assert_eq!(loader.trigger().await, LoadOutcome::Finished);

        let status = loader.status();
        assert_eq!(status.rendered, 8);
        assert_eq!(status.pages_requested, 2);
        assert_eq!(status.cursor, 8);
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_source_is_up_to_date() {
        let fetcher = MockFetcher::new().with_body(FEED, r#"{"items": []}"#);
        let (mut loader, _viewport, _rx) = loader(fetcher);

        assert_eq!(loader.start().await, LoadOutcome::Exhausted);
        assert_eq!(loader.surface().status(), STATUS_DONE);
        assert!(!loader.status().failed);
    }

    #[tokio::test]
    async fn test_signals_during_load_are_dropped() {
        let (fetcher, gate) = MockFetcher::new().with_body(FEED, &payload(3)).gated();
        let (mut loader, viewport, mut rx) = loader(fetcher.clone());

        loader.observe();
        assert!(viewport.report_visible());

        let host = async {
            while fetcher.requests().is_empty() {
                tokio::task::yield_now().await;
            }
            viewport.report_visible();
            viewport.report_visible();
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            gate.add_permits(1);
        };
        tokio::join!(loader.run(&mut rx), host);

        let status = loader.status();
        assert_eq!(status.pages_requested, 1);
        assert_eq!(status.dropped_signals, 2);
        assert_eq!(status.state, LoaderState::Exhausted);
        assert_eq!(fetcher.requests(), vec![FEED]);
    }

    #[tokio::test]
    async fn test_signals_ready_with_the_response_are_dropped() {
        let (fetcher, gate) = MockFetcher::new().with_body(FEED, &payload(8)).gated();
        let (mut loader, viewport, mut rx) = loader(fetcher.clone());

        loader.observe();
        assert!(viewport.report_visible());

        // The response and both signals become ready in the same wakeup.
        let host = async {
            while fetcher.requests().is_empty() {
                tokio::task::yield_now().await;
            }
            viewport.report_visible();
            viewport.report_visible();
            gate.add_permits(10);
        };
        let run = tokio::time::timeout(Duration::from_millis(100), loader.run(&mut rx));
        let (timed_out, ()) = tokio::join!(run, host);
        assert!(timed_out.is_err(), "loader should be idle, waiting for a signal");

        let status = loader.status();
        assert_eq!(status.pages_requested, 1);
        assert_eq!(status.dropped_signals, 2);
        assert_eq!(status.state, LoaderState::Idle);
        assert_eq!(status.rendered, 6);
    }

    #[tokio::test]
    async fn test_stale_signal_is_ignored() {
        let fetcher = MockFetcher::new().with_body(FEED, &payload(8));
        let (mut loader, _viewport, _rx) = loader(fetcher);
        loader.start().await;

        let outcome = loader
            .handle_signal(VisibilitySignal { generation: 99 })
            .await;
        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(loader.status().pages_requested, 1);
    }

    #[tokio::test]
    async fn test_reload_starts_new_session() {
        let fetcher = MockFetcher::new().with_body(FEED, &payload(8));
        let (mut loader, viewport, mut rx) = loader(fetcher.clone());
        loader.start().await;
        loader.trigger().await;
        assert_eq!(loader.state(), LoaderState::Exhausted);

        let outcome = loader.reload().await;
        assert_eq!(
            outcome,
            LoadOutcome::Page {
                rendered: 6,
                exhausted: false
            }
        );

        let status = loader.status();
        assert_eq!(status.generation, 2);
        assert_eq!(status.rendered, 6);
        assert_eq!(status.cursor, 6);
        assert_eq!(loader.surface().rendered_ids().len(), 6);
        assert_eq!(fetcher.requests().len(), 2);

        assert_eq!(
            loader.handle_signal(VisibilitySignal { generation: 1 }).await,
            LoadOutcome::Stale
        );

        assert!(viewport.report_visible());
        let signal = rx.recv().await.unwrap();
        assert_eq!(signal.generation, 2);
        assert_eq!(
            loader.handle_signal(signal).await,
            LoadOutcome::Page {
                rendered: 2,
                exhausted: true
            }
        );
    }

    #[tokio::test]
    async fn test_inject_and_remove() {
        let fetcher = MockFetcher::new().with_body(FEED, &payload(2));
        let (mut loader, _viewport, _rx) = loader(fetcher);
        loader.start().await;

        let pinned = FeedItem::builder(ItemKind::Quote)
            .body("Stay curious.")
            .build()
            .unwrap();
        let pinned_id = pinned.id().to_string();
        assert!(loader.inject(pinned.clone(), Placement::Prepend));
        assert!(!loader.inject(pinned, Placement::Append));
        assert_eq!(loader.surface().rendered_ids()[0], pinned_id);

        let duplicate = FeedItem::builder(ItemKind::LinkCard)
            .url("https://example.com/0")
            .build()
            .unwrap();
        assert!(!loader.inject(duplicate, Placement::Append));

        assert!(loader.remove("https://example.com/1"));
        assert!(!loader.remove("https://example.com/1"));
        assert_eq!(
            loader.surface().rendered_ids(),
            vec![pinned_id.as_str(), "https://example.com/0"]
        );
        assert_eq!(loader.status().rendered, 2);
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let mut config = Config::default();
        config.feed.page_size = 0;
        let ctx = AppContext::with_fetcher(config, Arc::new(MockFetcher::new())).unwrap();
        let surface = HtmlSurface::mount(&[], &ctx.config.feed, &ctx.config.render);
        let (viewport, _rx) = Viewport::channel();

        let result = Loader::new(&ctx, surface, viewport);
        assert!(matches!(result, Err(FeedError::InvalidArgument(_))));
    }
}
