pub mod file_fetcher;
pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::Result;

pub use file_fetcher::FileFetcher;
pub use http_fetcher::HttpFetcher;

/// Retrieves the raw bytes of a feed document.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>>;
}

/// Routes each location to HTTP or the filesystem by its scheme.
pub struct SourceFetcher {
    http: HttpFetcher,
    files: FileFetcher,
}

impl SourceFetcher {
    pub fn new(http: HttpFetcher) -> Self {
        Self {
            http,
            files: FileFetcher::new(),
        }
    }
}

#[async_trait]
impl Fetcher for SourceFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        if location.starts_with("http://") || location.starts_with("https://") {
            self.http.fetch(location).await
        } else {
            self.files.fetch(location).await
        }
    }
}
