//! Finds the first candidate endpoint that serves a usable feed document.

mod config;

pub use config::SourceConfig;

use serde_json::Value;
use url::Url;

use crate::app::{FeedError, Result};
use crate::fetcher::Fetcher;

const ABSOLUTE_SCHEMES: &[&str] = &["http", "https", "file"];

/// The payload of the candidate that won, and where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub url: String,
    pub payload: Value,
}

/// Result of trying a single candidate, for diagnostics.
#[derive(Debug)]
pub struct Probe {
    pub url: String,
    pub result: Result<Value>,
}

#[derive(Debug, Clone)]
pub struct SourceResolver {
    candidates: Vec<String>,
}

impl SourceResolver {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    /// Builds the candidate list, joining relative entries to `base_url`.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let base = config.base_url.as_deref().map(Url::parse).transpose()?;
        let candidates = config
            .candidates
            .iter()
            .map(|candidate| resolve_location(base.as_ref(), candidate))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(candidates))
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Tries each candidate once, in order. Candidate failures are logged and
    /// skipped; only running out of candidates is an error.
    pub async fn resolve(&self, fetcher: &(dyn Fetcher + Send + Sync)) -> Result<ResolvedSource> {
        for candidate in &self.candidates {
            match try_candidate(fetcher, candidate).await {
                Ok(payload) => {
                    tracing::info!("Loaded feed from {}", candidate);
                    return Ok(ResolvedSource {
                        url: candidate.clone(),
                        payload,
                    });
                }
                Err(e) => tracing::warn!("{}", e),
            }
        }

        Err(FeedError::NoSourceAvailable {
            attempted: self.candidates.clone(),
        })
    }

    /// Tries every candidate, even after one succeeds.
    pub async fn probe(&self, fetcher: &(dyn Fetcher + Send + Sync)) -> Vec<Probe> {
        let mut probes = Vec::with_capacity(self.candidates.len());
        for candidate in &self.candidates {
            probes.push(Probe {
                url: candidate.clone(),
                result: try_candidate(fetcher, candidate).await,
            });
        }
        probes
    }
}

async fn try_candidate(fetcher: &(dyn Fetcher + Send + Sync), candidate: &str) -> Result<Value> {
    let body = fetcher
        .fetch(candidate)
        .await
        .map_err(|e| FeedError::SourceFetchFailed {
            source_url: candidate.to_string(),
            reason: e.to_string(),
        })?;

    serde_json::from_slice(&body).map_err(|e| FeedError::SourceParseFailed {
        source_url: candidate.to_string(),
        reason: e.to_string(),
    })
}

fn resolve_location(base: Option<&Url>, candidate: &str) -> Result<String> {
    let candidate = candidate.trim();
    if let Ok(url) = Url::parse(candidate) {
        if ABSOLUTE_SCHEMES.contains(&url.scheme()) {
            return Ok(url.to_string());
        }
    }
    match base {
        Some(base) => Ok(base.join(candidate)?.to_string()),
        None => Ok(candidate.to_string()),
    }
}
