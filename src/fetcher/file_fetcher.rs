use std::path::PathBuf;

use async_trait::async_trait;
use url::Url;

use crate::app::{FeedError, Result};
use crate::fetcher::Fetcher;

/// Reads feed documents from disk, from plain paths or `file://` urls.
#[derive(Debug, Default, Clone)]
pub struct FileFetcher;

impl FileFetcher {
    pub fn new() -> Self {
        Self
    }

    fn path_for(location: &str) -> Result<PathBuf> {
        if location.starts_with("file://") {
            let url = Url::parse(location)?;
            return url
                .to_file_path()
                .map_err(|_| FeedError::InvalidArgument(format!("not a local file url: {}", location)));
        }
        Ok(PathBuf::from(location))
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let path = Self::path_for(location)?;
        let body = tokio::fs::read(&path).await?;
        tracing::debug!("Read {} bytes from {}", body.len(), path.display());
        Ok(body)
    }
}
