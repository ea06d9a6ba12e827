use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Render strategy for a feed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    VideoEmbed,
    Image,
    Quote,
    Story,
    LinkCard,
    SearchRedirect,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::VideoEmbed => "video-embed",
            ItemKind::Image => "image",
            ItemKind::Quote => "quote",
            ItemKind::Story => "story",
            ItemKind::LinkCard => "link-card",
            ItemKind::SearchRedirect => "search-redirect",
        }
    }

    /// Quote and story items carry their content inline and need no url.
    pub fn is_pure_text(self) -> bool {
        matches!(self, ItemKind::Quote | ItemKind::Story)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    YouTube,
    TikTok,
}

impl Platform {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "youtube" | "yt" => Some(Platform::YouTube),
            "tiktok" | "tt" => Some(Platform::TikTok),
            _ => None,
        }
    }

    fn accepts_id(self, id: &str) -> bool {
        match self {
            Platform::YouTube => {
                !id.is_empty()
                    && id
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            }
            Platform::TikTok => id.len() >= 8 && id.chars().all(|c| c.is_ascii_digit()),
        }
    }
}

/// Trusted description of an embedded player.
///
/// Only a platform and a validated external id are kept; the renderer builds
/// the player element from these, so nothing from the source document is ever
/// injected as markup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "EmbedParts")]
pub struct EmbedDescriptor {
    platform: Platform,
    external_id: String,
}

#[derive(Deserialize)]
struct EmbedParts {
    platform: Platform,
    external_id: String,
}

impl TryFrom<EmbedParts> for EmbedDescriptor {
    type Error = String;

    fn try_from(parts: EmbedParts) -> Result<Self, Self::Error> {
        EmbedDescriptor::new(parts.platform, &parts.external_id)
            .ok_or_else(|| format!("invalid {:?} id: {:?}", parts.platform, parts.external_id))
    }
}

impl EmbedDescriptor {
    pub fn new(platform: Platform, external_id: &str) -> Option<Self> {
        let external_id = external_id.trim();
        if !platform.accepts_id(external_id) {
            return None;
        }
        Some(Self {
            platform,
            external_id: external_id.to_string(),
        })
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Link to the content on its platform, for records that only carried an embed.
    pub fn canonical_url(&self) -> String {
        match self.platform {
            Platform::YouTube => format!("https://www.youtube.com/watch?v={}", self.external_id),
            Platform::TikTok => format!("https://www.tiktok.com/embed/v2/{}", self.external_id),
        }
    }
}

/// Canonical, immutable feed item.
///
/// Deserialization goes through [`FeedItemBuilder::build`], so a stored item
/// is held to the same invariants as a freshly normalized one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FeedItemParts")]
pub struct FeedItem {
    id: String,
    kind: ItemKind,
    title: String,
    url: Option<String>,
    thumbnail_url: Option<String>,
    embed: Option<EmbedDescriptor>,
    tags: Vec<String>,
    body: Option<String>,
    author: Option<String>,
}

impl FeedItem {
    pub fn builder(kind: ItemKind) -> FeedItemBuilder {
        FeedItemBuilder::new(kind)
    }

    /// A video item for a known YouTube id, used for the fallback feed.
    pub fn youtube(video_id: &str) -> Option<Self> {
        let embed = EmbedDescriptor::new(Platform::YouTube, video_id)?;
        FeedItem::builder(ItemKind::VideoEmbed)
            .url(embed.canonical_url())
            .embed(embed)
            .build()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    pub fn embed(&self) -> Option<&EmbedDescriptor> {
        self.embed.as_ref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }

    /// Stable key for a body-only item.
    pub fn text_id(body: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(body.as_bytes());
        let digest = hex::encode(hasher.finalize());
        format!("text-{}", &digest[..16])
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct FeedItemParts {
    id: String,
    kind: Option<ItemKind>,
    title: String,
    url: Option<String>,
    thumbnail_url: Option<String>,
    embed: Option<EmbedDescriptor>,
    tags: Vec<String>,
    body: Option<String>,
    author: Option<String>,
}

impl TryFrom<FeedItemParts> for FeedItem {
    type Error = String;

    fn try_from(parts: FeedItemParts) -> Result<Self, Self::Error> {
        let kind = parts.kind.ok_or("missing item kind")?;
        let mut builder = FeedItem::builder(kind)
            .id(parts.id)
            .title(parts.title)
            .tags(parts.tags);
        if let Some(url) = parts.url {
            builder = builder.url(url);
        }
        if let Some(thumbnail_url) = parts.thumbnail_url {
            builder = builder.thumbnail_url(thumbnail_url);
        }
        if let Some(embed) = parts.embed {
            builder = builder.embed(embed);
        }
        if let Some(body) = parts.body {
            builder = builder.body(body);
        }
        if let Some(author) = parts.author {
            builder = builder.author(author);
        }
        builder
            .build()
            .ok_or_else(|| format!("invalid {} item", kind.as_str()))
    }
}

/// Assembles a [`FeedItem`] and enforces its invariants in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct FeedItemBuilder {
    kind: ItemKind,
    explicit_id: Option<String>,
    title: String,
    url: Option<String>,
    thumbnail_url: Option<String>,
    embed: Option<EmbedDescriptor>,
    tags: Vec<String>,
    body: Option<String>,
    author: Option<String>,
}

impl FeedItemBuilder {
    fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            explicit_id: None,
            title: String::new(),
            url: None,
            thumbnail_url: None,
            embed: None,
            tags: Vec::new(),
            body: None,
            author: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.explicit_id = non_empty(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into().trim().to_string();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = non_empty(url.into());
        self
    }

    pub fn thumbnail_url(mut self, thumbnail_url: impl Into<String>) -> Self {
        self.thumbnail_url = non_empty(thumbnail_url.into());
        self
    }

    pub fn embed(mut self, embed: EmbedDescriptor) -> Self {
        self.embed = Some(embed);
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = non_empty(body.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = non_empty(author.into());
        self
    }

    /// Returns `None` when the item would break an invariant: no usable id,
    /// a video without an embed, or a non-text item without a url.
    pub fn build(self) -> Option<FeedItem> {
        if self.kind == ItemKind::VideoEmbed && self.embed.is_none() {
            return None;
        }
        if !self.kind.is_pure_text() && self.url.is_none() {
            return None;
        }

        let id = self
            .url
            .clone()
            .or(self.explicit_id)
            .or_else(|| non_empty(self.title.clone()))
            .or_else(|| self.body.as_deref().map(FeedItem::text_id))?;

        Some(FeedItem {
            id,
            kind: self.kind,
            title: self.title,
            url: self.url,
            thumbnail_url: self.thumbnail_url,
            embed: self.embed,
            tags: self.tags,
            body: self.body,
            author: self.author,
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
