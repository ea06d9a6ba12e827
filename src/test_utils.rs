//! Test doubles: an in-memory fetcher and a one-shot local HTTP server.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Semaphore;

use crate::app::{FeedError, Result};
use crate::fetcher::Fetcher;

#[derive(Debug, Clone)]
enum MockResponse {
    Body(String),
    Status(u16),
}

/// Serves canned bodies or HTTP statuses per location and records requests.
///
/// With a gate, every fetch waits for a permit, which lets a test hold a
/// request in flight.
#[derive(Default, Clone)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    requests: Arc<RwLock<Vec<String>>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, location: &str, body: &str) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(location.to_string(), MockResponse::Body(body.to_string()));
        self
    }

    pub fn with_status(self, location: &str, status: u16) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(location.to_string(), MockResponse::Status(status));
        self
    }

    /// Holds every fetch until the returned semaphore is given a permit.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.read().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        self.requests.write().unwrap().push(location.to_string());

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        let response = self.responses.read().unwrap().get(location).cloned();
        let status = match response {
            Some(MockResponse::Body(body)) => return Ok(body.into_bytes()),
            Some(MockResponse::Status(status)) => status,
            None => 404,
        };
        Err(FeedError::HttpStatus {
            url: location.to_string(),
            status,
        })
    }
}

/// Answers a single HTTP request on localhost with `status` and `body`, and
/// returns the url to request.
pub async fn serve_once(status: &str, body: &str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = vec![0u8; 4096];
        let _ = socket.read(&mut request).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });

    format!("http://{}/content_feed.json", addr)
}
