//! File provider for recorded payloads and local roster exports

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::provider::{RosterProvider, TelemetryProvider};
use crate::schema::LeaderboardData;
use crate::{Result, TimingError};

/// Reads payloads from the local filesystem.
///
/// The `url` passed to a fetch is a path, resolved against `root` when it is
/// relative.
#[derive(Debug, Clone, Default)]
pub struct FileProvider {
    root: Option<PathBuf>,
}

impl FileProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root`.
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self { root: Some(root.as_ref().to_path_buf()) }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.trim());
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    async fn read(&self, url: &str) -> Result<String> {
        let path = self.resolve(url);
        debug!("Reading {}", path.display());
        tokio::fs::read_to_string(&path).await.map_err(|e| TimingError::file_error(path, e))
    }
}

#[async_trait::async_trait]
impl TelemetryProvider for FileProvider {
    async fn fetch_leaderboard(&self, url: &str) -> Result<LeaderboardData> {
        let text = self.read(url).await?;
        LeaderboardData::from_json(&text)
    }
}

#[async_trait::async_trait]
impl RosterProvider for FileProvider {
    async fn fetch_roster(&self, url: &str) -> Result<String> {
        self.read(url).await
    }
}
