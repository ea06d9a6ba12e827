use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Source fetch failed for {source_url}: {reason}")]
    SourceFetchFailed { source_url: String, reason: String },

    #[error("Source parse failed for {source_url}: {reason}")]
    SourceParseFailed { source_url: String, reason: String },

    #[error("No feed source available (tried {})", .attempted.join(", "))]
    NoSourceAvailable { attempted: Vec<String> },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FeedError {
    /// Whether the source resolver recovers from this error by moving on to
    /// the next candidate.
    pub fn is_candidate_failure(&self) -> bool {
        matches!(
            self,
            FeedError::SourceFetchFailed { .. } | FeedError::SourceParseFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
