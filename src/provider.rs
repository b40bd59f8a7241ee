//! Provider traits for timing data sources

use crate::Result;
use crate::schema::LeaderboardData;

/// Source of raw leaderboard payloads.
///
/// Providers abstract over where the payload comes from (HTTP endpoint,
/// recorded file, test double). Implementations must not retry; a failed
/// fetch is reported once and the next refresh tries again.
#[async_trait::async_trait]
pub trait TelemetryProvider: Send + Sync + 'static {
    /// Fetch and decode one leaderboard payload.
    ///
    /// Returns:
    /// - `Ok(data)` - Payload decoded
    /// - `Err(e)` - Transport, status or decode failure
    async fn fetch_leaderboard(&self, url: &str) -> Result<LeaderboardData>;
}

/// Source of roster text.
#[async_trait::async_trait]
pub trait RosterProvider: Send + Sync + 'static {
    /// Fetch the raw roster text. Parsing happens in the registry.
    async fn fetch_roster(&self, url: &str) -> Result<String>;
}
