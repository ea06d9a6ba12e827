use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use reqwest::Client;

use crate::app::{FeedError, Result};
use crate::fetcher::Fetcher;

pub const DEFAULT_USER_AGENT: &str = "scrollfeed/0.1.0";

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_options(DEFAULT_USER_AGENT, None)
    }

    /// `timeout` of `None` leaves requests unbounded.
    pub fn with_options(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

        let mut builder = Client::builder()
            .gzip(true)
            .brotli(true)
            .user_agent(user_agent)
            .default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let response = self.client.get(location).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus {
                url: location.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?.to_vec();
        tracing::debug!("Fetched {} bytes from {}", body.len(), location);
        Ok(body)
    }
}
