// src/ingest/fetch.rs
use std::time::Duration;

use crate::error::FetchError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (MalawiJobWakeupFetcher/1.0)";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Single-attempt HTTP GET for listing pages. No retries.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Default for Fetcher {
    /// Default UA and timeout; a bare client if even those are rejected.
    fn default() -> Self {
        Self::with_defaults().unwrap_or_else(|_| Self {
            client: reqwest::Client::new(),
        })
    }
}

impl Fetcher {
    pub fn new(user_agent: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_defaults() -> anyhow::Result<Self> {
        Self::new(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT_SECS)
    }

    pub async fn fetch(&self, source_name: &str, url: &str) -> Result<String, FetchError> {
        let request_failed = |cause| FetchError::Request {
            source_name: source_name.to_string(),
            cause,
        };

        let resp = self.client.get(url).send().await.map_err(request_failed)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                source_name: source_name.to_string(),
                status,
            });
        }

        resp.text().await.map_err(request_failed)
    }
}
