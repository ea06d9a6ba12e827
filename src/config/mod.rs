//! Configuration management for scrollfeed.
//!
//! Configuration is read from `~/.config/scrollfeed/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use crate::resolver::SourceConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourceConfig,
    pub feed: FeedConfig,
    pub render: RenderConfig,
}

/// Paging, mount point and fallback settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Items appended per page (default: 6)
    pub page_size: usize,
    /// Skeleton placeholders shown while a page loads (default: 3)
    pub skeleton_count: usize,
    /// Container element ids, tried in order
    pub container_ids: Vec<String>,
    /// YouTube ids shown when no source can be loaded
    pub fallback_video_ids: Vec<String>,
    /// Maximum legacy keywords turned into search items (default: 8)
    pub keyword_limit: usize,
    /// Image service used for keyword placeholder thumbnails
    pub placeholder_thumbnail_base: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 6,
            skeleton_count: 3,
            container_ids: vec!["feed".to_string(), "grid".to_string()],
            fallback_video_ids: vec![
                "kXYiU_JCYtU".to_string(),
                "3YxaaGgTQYM".to_string(),
                "ktvTqknDobU".to_string(),
            ],
            keyword_limit: crate::normalizer::DEFAULT_KEYWORD_LIMIT,
            placeholder_thumbnail_base: crate::normalizer::DEFAULT_PLACEHOLDER_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Embed YouTube through youtube-nocookie.com (default: true)
    pub privacy_enhanced_embeds: bool,
    /// Margin hint handed to the host's visibility observer
    pub sentinel_root_margin: String,
    /// Add the built-in stylesheet when the host page lacks one (default: true)
    pub inject_styles: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            privacy_enhanced_embeds: true,
            sentinel_root_margin: "1200px 0px 0px 0px".to_string(),
            inject_styles: true,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path: `~/.config/scrollfeed/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("scrollfeed").join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.page_size == 0 {
            return Err(ConfigError::Invalid("feed.page_size must be at least 1".into()));
        }
        if self.sources.candidates.is_empty() {
            return Err(ConfigError::Invalid(
                "sources.candidates must name at least one endpoint".into(),
            ));
        }
        Ok(())
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::info!("Wrote default configuration to {}", path.display());
        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# scrollfeed configuration

[sources]
# Feed documents, tried in order until one loads and parses as JSON.
# Absolute http(s):// or file:// locations are used as-is; relative ones are
# joined to base_url, or read from the working directory when it is unset.
candidates = ["content_feed.json", "content.json"]

# base_url = "https://example.org/"

# Seconds before a fetch is abandoned. Unset means wait indefinitely.
# fetch_timeout_secs = 15

user_agent = "scrollfeed/0.1.0"

[feed]
page_size = 6
skeleton_count = 3

# Element ids searched for the feed container, in priority order
container_ids = ["feed", "grid"]

# Shown when no source could be loaded
fallback_video_ids = ["kXYiU_JCYtU", "3YxaaGgTQYM", "ktvTqknDobU"]

# Legacy {"youtube": {"keywords": [...]}} documents use at most this many keywords
keyword_limit = 8
placeholder_thumbnail_base = "https://placehold.co/640x360"

[render]
privacy_enhanced_embeds = true
sentinel_root_margin = "1200px 0px 0px 0px"
inject_styles = true
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
