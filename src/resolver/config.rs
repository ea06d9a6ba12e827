use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::fetcher::http_fetcher::DEFAULT_USER_AGENT;

/// Where feed documents come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Candidate feed documents, in priority order
    pub candidates: Vec<String>,

    /// Base that relative candidates are joined to
    pub base_url: Option<String>,

    /// Per-request timeout in seconds; `None` waits indefinitely
    pub fetch_timeout_secs: Option<u64>,

    /// User agent string sent with HTTP requests
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            candidates: vec!["content_feed.json".to_string(), "content.json".to_string()],
            base_url: None,
            fetch_timeout_secs: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }
}
