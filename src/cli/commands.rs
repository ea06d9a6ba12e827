use std::path::Path;

use crate::app::{AppContext, FeedError, Result};
use crate::feed::dedup;
use crate::loader::{HtmlSurface, Loader, Viewport};

pub async fn render_feed(
    ctx: &AppContext,
    out: &Path,
    pages: Option<usize>,
    open_after: bool,
    print_status: bool,
) -> Result<()> {
    if pages == Some(0) {
        return Err(FeedError::InvalidArgument(
            "at least one page must be rendered".into(),
        ));
    }

    let surface = HtmlSurface::mount(&[], &ctx.config.feed, &ctx.config.render);
    let (viewport, mut signals) = Viewport::channel();
    let mut loader = Loader::new(ctx, surface, viewport.clone())?;

    loader.start().await;
    let mut loaded = 1;
    while !loader.state().is_terminal() && pages.map_or(true, |max| loaded < max) {
        // Stands in for the sentinel scrolling into view.
        if !viewport.report_visible() {
            break;
        }
        let Some(signal) = signals.recv().await else {
            break;
        };
        loader.handle_signal(signal).await;
        loaded += 1;
    }

    let status = loader.status();
    if print_status {
        println!("{}", serde_json::to_string_pretty(&status)?);
    }

    let document = loader.surface().to_document("scrollfeed");
    tokio::fs::write(out, document).await?;

    match &status.source_url {
        Some(source) => println!(
            "Wrote {} of {} items from {} to {}",
            status.rendered,
            status.total,
            source,
            out.display()
        ),
        None => println!(
            "No feed source available, wrote fallback page to {}",
            out.display()
        ),
    }

    if open_after {
        open::that(out)?;
    }
    Ok(())
}

pub async fn list_items(ctx: &AppContext) -> Result<()> {
    let source = ctx.resolver.resolve(ctx.fetcher.as_ref()).await?;
    let items = dedup(ctx.normalizer.normalize(&source.payload));

    if items.is_empty() {
        println!("No items in {}", source.url);
        return Ok(());
    }

    println!("{} items from {}", items.len(), source.url);
    for item in &items {
        println!(
            "{:<16} {}  {}",
            item.kind().as_str(),
            item.display_title(),
            item.id()
        );
    }
    Ok(())
}

pub async fn check_sources(ctx: &AppContext) -> Result<()> {
    let probes = ctx.resolver.probe(ctx.fetcher.as_ref()).await;

    let mut winner = None;
    for probe in &probes {
        match &probe.result {
            Ok(payload) => {
                let count = ctx.normalizer.normalize(payload).len();
                println!("  ok    {} ({} items)", probe.url, count);
                winner.get_or_insert(probe.url.as_str());
            }
            Err(e) => println!("  fail  {}", e),
        }
    }

    match winner {
        Some(url) => println!("Feed loads from {}", url),
        None => println!("No feed source available, the fallback feed would be shown"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::test_utils::MockFetcher;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_render_writes_document() {
        let fetcher = MockFetcher::new().with_body(
            "feed.json",
            r#"{"items": [
                {"title": "One", "url": "https://example.com/1"},
                {"title": "Two", "url": "https://example.com/2"},
                {"title": "Three", "url": "https://example.com/3"}
            ]}"#,
        );
        let mut config = Config::default();
        config.sources.candidates = vec!["feed.json".into()];
        config.feed.page_size = 1;
        let ctx = AppContext::with_fetcher(config, Arc::new(fetcher)).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("feed.html");
        render_feed(&ctx, &out, Some(2), false, false).await.unwrap();

        let html = std::fs::read_to_string(&out).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("https://example.com/1"));
        assert!(html.contains("https://example.com/2"));
        assert!(!html.contains("https://example.com/3"));
        assert!(html.contains("Scroll for more…"));
    }

    #[tokio::test]
    async fn test_render_zero_pages_is_rejected() {
        let fetcher = MockFetcher::new().with_body("feed.json", r#"{"items": []}"#);
        let mut config = Config::default();
        config.sources.candidates = vec!["feed.json".into()];
        let ctx = AppContext::with_fetcher(config, Arc::new(fetcher.clone())).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("feed.html");
        let err = render_feed(&ctx, &out, Some(0), false, false)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::InvalidArgument(_)));
        assert!(fetcher.requests().is_empty());
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_render_without_source_writes_fallback() {
        let mut config = Config::default();
        config.sources.candidates = vec!["missing.json".into()];
        let ctx = AppContext::with_fetcher(config, Arc::new(MockFetcher::new())).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("feed.html");
        render_feed(&ctx, &out, None, false, false).await.unwrap();

        let html = std::fs::read_to_string(&out).unwrap();
        assert!(html.contains("youtube-nocookie.com/embed/kXYiU_JCYtU"));
        assert!(html.contains("Live feed unavailable. Showing fallback."));
    }
}
