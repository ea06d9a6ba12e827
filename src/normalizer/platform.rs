//! Platform id extraction for embeddable video links.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::domain::{EmbedDescriptor, Platform};

static RE_YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:v=|/embed/|youtu\.be/)([a-zA-Z0-9_-]{6,})").expect("valid regex")
});
static RE_TIKTOK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/video/(\d{8,})").expect("valid regex"));

/// Extracts a YouTube video id from a watch link, a short link, or anything
/// carrying `v=`, `/embed/` or `youtu.be/` followed by an id-like token.
pub fn youtube_id(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    if let Ok(parsed) = Url::parse(url) {
        let host = parsed.host_str().unwrap_or_default();

        if host.contains("youtube.com") {
            let v = parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned());
            if let Some(id) = v.filter(|id| is_youtube_token(id)) {
                return Some(id);
            }
        }

        if host == "youtu.be" {
            let path = parsed.path();
            let id = path.strip_prefix('/').unwrap_or(path);
            if is_youtube_token(id) {
                return Some(id.to_string());
            }
        }
    }

    RE_YOUTUBE_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extracts a TikTok video id: eight or more digits after a `/video/` segment.
pub fn tiktok_id(url: &str) -> Option<String> {
    RE_TIKTOK_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// First embeddable platform that recognises the url, YouTube before TikTok.
pub fn detect_embed(url: &str) -> Option<EmbedDescriptor> {
    youtube_id(url)
        .and_then(|id| EmbedDescriptor::new(Platform::YouTube, &id))
        .or_else(|| tiktok_id(url).and_then(|id| EmbedDescriptor::new(Platform::TikTok, &id)))
}

fn is_youtube_token(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_watch_link() {
        assert_eq!(
            youtube_id("https://www.youtube.com/watch?v=abc123XYZ"),
            Some("abc123XYZ".into())
        );
    }

    #[test]
    fn test_youtube_short_link() {
        assert_eq!(youtube_id("https://youtu.be/abc123XYZ"), Some("abc123XYZ".into()));
    }

    #[test]
    fn test_youtube_watch_link_with_extra_params() {
        assert_eq!(
            youtube_id("https://m.youtube.com/watch?feature=share&v=5TbUxGZtwGI&t=10"),
            Some("5TbUxGZtwGI".into())
        );
    }

    #[test]
    fn test_youtube_embed_path_uses_regex() {
        assert_eq!(
            youtube_id("https://www.youtube.com/embed/kXYiU_JCYtU?rel=0"),
            Some("kXYiU_JCYtU".into())
        );
        assert_eq!(
            youtube_id("<iframe src=\"https://www.youtube-nocookie.com/embed/3YxaaGgTQYM\">"),
            Some("3YxaaGgTQYM".into())
        );
    }

    #[test]
    fn test_youtube_short_token_rejected_by_regex() {
        assert_eq!(youtube_id("https://example.com/?v=abc"), None);
        assert_eq!(youtube_id("https://example.com/?v=abcdef"), Some("abcdef".into()));
    }

    #[test]
    fn test_youtube_no_match() {
        assert_eq!(youtube_id(""), None);
        assert_eq!(youtube_id("https://example.com/article"), None);
        assert_eq!(youtube_id("https://www.youtube.com/results?search_query=calm"), None);
    }

    #[test]
    fn test_tiktok_id() {
        assert_eq!(
            tiktok_id("https://www.tiktok.com/@someone/video/12345678901"),
            Some("12345678901".into())
        );
        assert_eq!(tiktok_id("https://www.tiktok.com/@someone/video/1234567"), None);
        assert_eq!(tiktok_id("https://www.tiktok.com/@someone"), None);
    }

    #[test]
    fn test_detect_embed_prefers_youtube() {
        let embed = detect_embed("https://youtu.be/abc123XYZ").unwrap();
        assert_eq!(embed.platform(), Platform::YouTube);

        let embed = detect_embed("https://www.tiktok.com/@x/video/7234567890123").unwrap();
        assert_eq!(embed.platform(), Platform::TikTok);
        assert_eq!(embed.external_id(), "7234567890123");

        assert!(detect_embed("https://example.com/photo.jpg").is_none());
    }
}
