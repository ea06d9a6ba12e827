//! Feed item markup.
//!
//! Every function here is pure: the same item always yields the same tree.

pub mod markup;
pub mod styles;

pub use markup::{safe_url, Element, Node};

use crate::config::RenderConfig;
use crate::domain::{EmbedDescriptor, FeedItem, ItemKind, Platform};

const YOUTUBE_ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share";
const TIKTOK_ALLOW: &str = "encrypted-media; autoplay; clipboard-write; fullscreen; picture-in-picture";

#[derive(Debug, Clone)]
pub struct Renderer {
    privacy_enhanced: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            privacy_enhanced: true,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            privacy_enhanced: config.privacy_enhanced_embeds,
        }
    }

    pub fn render(&self, item: &FeedItem) -> Element {
        let card = match item.kind() {
            ItemKind::VideoEmbed => self.video(item),
            ItemKind::Image => self.image(item),
            ItemKind::Quote => self.quote(item),
            ItemKind::Story => self.story(item),
            ItemKind::LinkCard => self.link_card(item),
            ItemKind::SearchRedirect => self.search_redirect(item),
        };
        card.attr("data-item-id", item.id())
            .attr("data-kind", item.kind().as_str())
            .children(tags(item))
    }

    /// Player url built from the descriptor alone.
    pub fn embed_src(&self, embed: &EmbedDescriptor) -> String {
        match embed.platform() {
            Platform::YouTube => {
                let host = if self.privacy_enhanced {
                    "www.youtube-nocookie.com"
                } else {
                    "www.youtube.com"
                };
                format!(
                    "https://{}/embed/{}?rel=0&modestbranding=1",
                    host,
                    embed.external_id()
                )
            }
            Platform::TikTok => format!("https://www.tiktok.com/embed/v2/{}", embed.external_id()),
        }
    }

    fn video(&self, item: &FeedItem) -> Element {
        let mut media = Element::new("div").class("ps-media");
        if let Some(embed) = item.embed() {
            let allow = match embed.platform() {
                Platform::YouTube => YOUTUBE_ALLOW,
                Platform::TikTok => TIKTOK_ALLOW,
            };
            let mut iframe = Element::new("iframe")
                .class("ps-embed")
                .attr("loading", "lazy")
                .attr("title", item.display_title())
                .attr("allow", allow)
                .flag("allowfullscreen")
                .attr("src", self.embed_src(embed));
            if embed.platform() == Platform::YouTube {
                iframe = iframe.attr("referrerpolicy", "strict-origin-when-cross-origin");
            }
            media = media.child(iframe);
        }

        post().child(media).child(meta(item.title(), item.url(), "Open"))
    }

    fn image(&self, item: &FeedItem) -> Element {
        let src = item.url().and_then(safe_url);
        let mut card = post();
        if let Some(src) = src {
            card = card.child(
                Element::new("img")
                    .class("ps-img")
                    .attr("loading", "lazy")
                    .attr("src", src)
                    .attr("alt", item.title()),
            );
        }
        card.child(meta(item.title(), item.url(), "Open"))
    }

    fn quote(&self, item: &FeedItem) -> Element {
        let text = item.body().unwrap_or(item.title());
        let mut quote = Element::new("blockquote")
            .class("ps-quote")
            .child(Element::new("p").text(text));
        if let Some(author) = item.author() {
            quote = quote.child(Element::new("footer").child(Element::new("cite").text(author)));
        }

        let mut card = post_with("ps-post ps-text");
        if item.body().is_some() && !item.title().is_empty() {
            card = card.child(Element::new("div").class("ps-title").text(item.title()));
        }
        card = card.child(quote);
        match item.url().and_then(safe_url) {
            Some(url) => card.child(actions(url, "Source")),
            None => card,
        }
    }

    fn story(&self, item: &FeedItem) -> Element {
        let paragraphs = item
            .body()
            .unwrap_or_default()
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| Element::new("p").text(p));

        let mut card = post_with("ps-post ps-text")
            .child(Element::new("h3").class("ps-title").text(item.title()))
            .child(Element::new("div").class("ps-story").children(paragraphs));
        if let Some(author) = item.author() {
            card = card.child(Element::new("div").class("ps-byline").text(author));
        }
        match item.url().and_then(safe_url) {
            Some(url) => card.child(actions(url, "Read more")),
            None => card,
        }
    }

    fn link_card(&self, item: &FeedItem) -> Element {
        post()
            .children(thumbnail(item))
            .child(meta(item.title(), item.url(), "Open"))
    }

    fn search_redirect(&self, item: &FeedItem) -> Element {
        post_with("ps-post ps-search")
            .children(thumbnail(item))
            .child(meta(item.title(), item.url(), "Search"))
    }

    /// Grey placeholder card shown while a page loads.
    pub fn skeleton(&self) -> Element {
        post_with("ps-post ps-skeleton")
            .child(Element::new("div").class("ps-media"))
            .child(
                Element::new("div")
                    .class("ps-meta")
                    .child(Element::new("div").class("ps-title"))
                    .child(Element::new("div").class("ps-actions")),
            )
    }

    /// Shown in place of the feed when nothing could be loaded.
    pub fn unavailable_notice(&self, candidates: &[String]) -> Element {
        let mut actions = Element::new("div").class("ps-actions").text("Add ");
        for (i, candidate) in candidates.iter().enumerate() {
            if i > 0 {
                actions = actions.text(" or ");
            }
            actions = actions.child(Element::new("code").text(candidate.as_str()));
        }
        actions = actions.text(".");

        post().child(
            Element::new("div")
                .class("ps-meta")
                .child(Element::new("div").class("ps-title").text("Feed not available"))
                .child(actions),
        )
    }
}

fn post() -> Element {
    post_with("ps-post")
}

fn post_with(classes: &str) -> Element {
    Element::new("article").class(classes)
}

fn meta(title: &str, url: Option<&str>, label: &str) -> Element {
    let mut meta = Element::new("div")
        .class("ps-meta")
        .child(Element::new("div").class("ps-title").text(title));
    if let Some(url) = url.and_then(safe_url) {
        meta = meta.child(actions(url, label));
    }
    meta
}

fn actions(url: &str, label: &str) -> Element {
    Element::new("div").class("ps-actions").child(
        Element::new("a")
            .attr("href", url)
            .attr("target", "_blank")
            .attr("rel", "noopener")
            .text(label),
    )
}

fn thumbnail(item: &FeedItem) -> Option<Element> {
    let src = item.thumbnail_url().and_then(safe_url)?;
    Some(
        Element::new("img")
            .class("ps-img")
            .attr("loading", "lazy")
            .attr("src", src)
            .attr("alt", item.title()),
    )
}

fn tags(item: &FeedItem) -> Option<Element> {
    if item.tags().is_empty() || item.kind() == ItemKind::SearchRedirect {
        return None;
    }
    Some(
        Element::new("ul")
            .class("ps-tags")
            .children(item.tags().iter().map(|t| Element::new("li").text(t.as_str()))),
    )
}
