//! # scrollfeed
//!
//! Ingests a JSON content feed and renders it page by page as the reader
//! scrolls.
//!
//! ## Architecture
//!
//! ```text
//! Resolver → Normalizer → Deduplicator → Pager → Renderer → Surface
//!                                          ↑
//!                                   Loader (visibility signals)
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Render every page of ./content_feed.json to feed.html
//! scrollfeed render
//!
//! # Two pages from a remote feed, then open the result
//! scrollfeed --base https://example.org/ render --pages 2 --open
//!
//! # See which source candidates load
//! scrollfeed check
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the fetcher,
/// resolver, normalizer and renderer.
pub mod app;

/// Command-line interface using clap.
///
/// - `render [--out PATH] [--pages N] [--open] [--status]` - Write the feed as HTML
/// - `items` - List normalized items
/// - `check` - Probe every source candidate
pub mod cli;

/// Configuration loaded from `~/.config/scrollfeed/config.toml`.
pub mod config;

/// Canonical feed items and embed descriptors.
pub mod domain;

/// Per-session state: deduplication, paging and the session itself.
pub mod feed;

/// Byte retrieval over HTTP or from local files.
pub mod fetcher;

/// Viewport-driven loading state machine and its mount points.
pub mod loader;

/// Raw feed records to [`FeedItem`](domain::FeedItem)s.
pub mod normalizer;

/// Item cards as escaped markup trees.
pub mod render;

/// First-available source selection.
pub mod resolver;

#[cfg(test)]
pub mod test_utils;
