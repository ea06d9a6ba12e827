pub mod platform;
pub mod raw;

use serde_json::Value;
use url::Url;

use crate::config::FeedConfig;
use crate::domain::{EmbedDescriptor, FeedItem, FeedItemBuilder, ItemKind, Platform};

use self::raw::{RawEmbed, RawRecord};

pub const DEFAULT_KEYWORD_LIMIT: usize = 8;
pub const DEFAULT_PLACEHOLDER_BASE: &str = "https://placehold.co/640x360";

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".avif", ".svg"];

/// Turns source JSON into canonical [`FeedItem`]s.
#[derive(Debug, Clone)]
pub struct Normalizer {
    keyword_limit: usize,
    placeholder_base: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            keyword_limit: DEFAULT_KEYWORD_LIMIT,
            placeholder_base: DEFAULT_PLACEHOLDER_BASE.to_string(),
        }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self {
            keyword_limit: config.keyword_limit,
            placeholder_base: config.placeholder_thumbnail_base.clone(),
        }
    }

    /// Normalizes a whole payload. Records that cannot be salvaged are skipped.
    pub fn normalize(&self, payload: &Value) -> Vec<FeedItem> {
        let records = raw::items(payload);

        if records.is_empty() {
            let keywords = raw::legacy_keywords(payload);
            if !keywords.is_empty() {
                tracing::debug!("No items in payload, using {} legacy keywords", keywords.len());
            }
            return keywords
                .iter()
                .take(self.keyword_limit)
                .filter_map(|keyword| self.search_redirect(keyword, None))
                .collect();
        }

        let items: Vec<FeedItem> = records
            .iter()
            .flat_map(|record| self.normalize_record(record))
            .collect();

        if items.len() < records.len() {
            tracing::debug!(
                "Normalized {} records into {} items",
                records.len(),
                items.len()
            );
        }
        items
    }

    /// Normalizes one record.
    ///
    /// Yields at most one item, except for a url-less record carrying
    /// keywords, which expands into one search-redirect item per keyword.
    pub fn normalize_record(&self, value: &Value) -> Vec<FeedItem> {
        let Some(record) = RawRecord::from_value(value) else {
            return Vec::new();
        };

        let url = non_blank(record.url.as_deref());
        let body = non_blank(record.text.as_deref());
        let title = record.title.as_deref().unwrap_or_default().trim().to_string();
        let embed = self.resolve_embed(&record, url);
        let kind_hint = record.kind.as_deref().map(|k| k.trim().to_ascii_lowercase());

        let item = match url {
            Some(url) => self.linked_item(&record, url, &title, body, embed, kind_hint.as_deref()),
            None if body.is_some() => self.text_item(&record, &title, body, None, kind_hint.as_deref()),
            None if !record.keywords.is_empty() => {
                let thumb = non_blank(record.thumb.as_deref());
                return record
                    .keywords
                    .iter()
                    .filter_map(|keyword| self.search_redirect(keyword, thumb))
                    .collect();
            }
            None => match embed {
                Some(embed) => self
                    .base(ItemKind::VideoEmbed, &record, &title)
                    .url(embed.canonical_url())
                    .embed(embed)
                    .build(),
                None if !title.is_empty() => {
                    self.text_item(&record, &title, None, None, kind_hint.as_deref())
                }
                None => None,
            },
        };

        if item.is_none() {
            tracing::debug!("Dropping unsalvageable feed record");
        }
        item.into_iter().collect()
    }

    /// Builds a search-redirect item for a keyword.
    pub fn search_redirect(&self, keyword: &str, thumbnail: Option<&str>) -> Option<FeedItem> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return None;
        }
        let encoded = urlencoding::encode(keyword);
        let thumbnail = thumbnail
            .map(String::from)
            .unwrap_or_else(|| format!("{}?text={}", self.placeholder_base, encoded));

        FeedItem::builder(ItemKind::SearchRedirect)
            .title(format!("YouTube: {}", keyword))
            .url(format!(
                "https://www.youtube.com/results?search_query={}",
                encoded
            ))
            .thumbnail_url(thumbnail)
            .tags(vec![keyword.to_string()])
            .build()
    }

    /// A trusted descriptor wins over anything extracted from the url; legacy
    /// markup is only mined for an id, never kept.
    fn resolve_embed(&self, record: &RawRecord, url: Option<&str>) -> Option<EmbedDescriptor> {
        let descriptor = match &record.embed {
            Some(RawEmbed::Descriptor { platform, id }) => {
                Platform::parse(platform).and_then(|p| EmbedDescriptor::new(p, id))
            }
            _ => None,
        };

        descriptor
            .or_else(|| url.and_then(platform::detect_embed))
            .or_else(|| match &record.embed {
                Some(RawEmbed::Markup(markup)) => platform::detect_embed(markup),
                _ => None,
            })
    }

    fn linked_item(
        &self,
        record: &RawRecord,
        url: &str,
        title: &str,
        body: Option<&str>,
        embed: Option<EmbedDescriptor>,
        kind_hint: Option<&str>,
    ) -> Option<FeedItem> {
        let has_text = body.is_some() || !title.is_empty();

        let kind = match kind_hint {
            Some("video" | "video-embed" | "youtube" | "tiktok" | "embed") if embed.is_some() => {
                ItemKind::VideoEmbed
            }
            Some("video" | "video-embed" | "youtube" | "tiktok" | "embed") => ItemKind::LinkCard,
            Some("image" | "photo" | "img") => ItemKind::Image,
            Some("quote") if has_text => ItemKind::Quote,
            Some("story" | "text" | "article") if has_text => ItemKind::Story,
            Some("link" | "link-card" | "card") => ItemKind::LinkCard,
            Some("search" | "search-redirect") => ItemKind::SearchRedirect,
            _ if embed.is_some() => ItemKind::VideoEmbed,
            _ if looks_like_image(url) => ItemKind::Image,
            _ => ItemKind::LinkCard,
        };

        if kind.is_pure_text() {
            return self.text_item(record, title, body, Some(url), kind_hint);
        }

        let mut builder = self.base(kind, record, title).url(url);
        if let Some(thumb) = non_blank(record.thumb.as_deref()) {
            builder = builder.thumbnail_url(thumb);
        }
        if kind == ItemKind::VideoEmbed {
            if let Some(embed) = embed {
                builder = builder.embed(embed);
            }
        }
        builder.build()
    }

    fn text_item(
        &self,
        record: &RawRecord,
        title: &str,
        body: Option<&str>,
        url: Option<&str>,
        kind_hint: Option<&str>,
    ) -> Option<FeedItem> {
        let kind = match kind_hint {
            Some("story" | "text" | "article") => ItemKind::Story,
            _ => ItemKind::Quote,
        };

        let mut builder = self.base(kind, record, title);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        if let Some(url) = url {
            builder = builder.url(url);
        }
        if let Some(author) = non_blank(record.author.as_deref()) {
            builder = builder.author(author);
        }
        builder.build()
    }

    fn base(&self, kind: ItemKind, record: &RawRecord, title: &str) -> FeedItemBuilder {
        let mut tags = record.tags.clone();
        for keyword in &record.keywords {
            if !tags.contains(keyword) {
                tags.push(keyword.clone());
            }
        }

        let mut builder = FeedItem::builder(kind).title(title).tags(tags);
        if let Some(id) = non_blank(record.id.as_deref()) {
            builder = builder.id(id);
        }
        builder
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn looks_like_image(url: &str) -> bool {
    let path = Url::parse(url)
        .map(|u| u.path().to_ascii_lowercase())
        .unwrap_or_else(|_| url.to_ascii_lowercase());
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
