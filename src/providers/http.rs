//! HTTP provider for live timing endpoints and roster exports

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, trace};

use crate::provider::{RosterProvider, TelemetryProvider};
use crate::schema::LeaderboardData;
use crate::{Result, TimingError};

/// Request timeout applied to every fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser-like user agent; some timing servers reject unknown clients.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Fetches payloads over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: Client,
    timeout: Duration,
}

impl HttpProvider {
    /// Create a provider with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TimingError::http("<client>", e))?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and return the body of a successful response.
    async fn get_text(&self, url: &str) -> Result<String> {
        let url = url.trim();
        let parsed = reqwest::Url::parse(url).map_err(|e| TimingError::invalid_url(url, e.to_string()))?;

        debug!("GET {}", parsed);
        let response = self.client.get(parsed).send().await.map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TimingError::status(url, status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.classify(url, e))?;
        trace!("Received {} bytes from {}", body.len(), url);
        Ok(body)
    }

    fn classify(&self, url: &str, error: reqwest::Error) -> TimingError {
        if error.is_timeout() {
            TimingError::Timeout { duration: self.timeout }
        } else {
            TimingError::http(url, error)
        }
    }
}

#[async_trait::async_trait]
impl TelemetryProvider for HttpProvider {
    async fn fetch_leaderboard(&self, url: &str) -> Result<LeaderboardData> {
        let body = self.get_text(url).await?;
        LeaderboardData::from_json(&body)
    }
}

#[async_trait::async_trait]
impl RosterProvider for HttpProvider {
    async fn fetch_roster(&self, url: &str) -> Result<String> {
        self.get_text(url).await
    }
}
