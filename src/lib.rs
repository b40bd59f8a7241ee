//! Live racing leaderboard engine.
//!
//! Pitboard turns a simulator's live timings payload into a classified, sorted
//! leaderboard, derives pace metrics relative to the session leader, and flags
//! drivers registered in a championship roster.
//!
//! # Features
//!
//! - **Normalization**: nanosecond payloads to millisecond entries, sentinel
//!   times treated as "no time"
//! - **Classification**: ordered, first-match-wins car class rules
//! - **Pace metrics**: percentage of the leader, gap, severity badge
//! - **Registration**: two-tier roster matching with stale-load protection
//! - **Live feed**: periodic and on-demand refresh over a watch channel
//!
//! # Quick Start
//!
//! ```rust
//! use pitboard::schema::LeaderboardData;
//! use pitboard::transform::process_leaderboard;
//! use pitboard::types::CarClassRule;
//!
//! let json = r#"{
//!     "ConnectedDrivers": [{
//!         "CarInfo": { "DriverName": "Ivan Ivanov", "TeamName": "", "DriverGUID": "7656" },
//!         "Cars": { "ks_ferrari_296_gt3": { "CarName": "Ferrari 296 GT3", "BestLap": 95234000000 } }
//!     }]
//! }"#;
//!
//! let data = LeaderboardData::from_json(json)?;
//! let rules = vec![CarClassRule::new("GT3", ["GT3"])];
//! let entries = process_leaderboard(&data, &rules);
//!
//! assert_eq!(entries[0].best_lap, Some(95_234));
//! assert_eq!(entries[0].car_class, "GT3");
//! # Ok::<(), pitboard::TimingError>(())
//! ```
//!
//! ## Example (live feed)
//!
//! ```rust,no_run
//! use pitboard::{Pitboard, Settings};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> pitboard::Result<()> {
//!     let settings = Settings::load("pitboard.yaml").await?;
//!     let feed = Pitboard::connect(&settings)?;
//!     let mut updates = Box::pin(feed.updates());
//!
//!     while let Some(snapshot) = updates.next().await {
//!         println!("{} entries on {}", snapshot.leaderboard.len(), snapshot.track);
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
pub mod format;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Pipeline
pub mod matching;
pub mod schema;
pub mod transform;
pub mod view;

// Data sources
pub mod feed;
pub mod provider;
pub mod providers;

// Core exports
pub use config::Settings;
pub use error::*;
pub use types::*;

// Main API exports
pub use feed::{FeedOptions, LeaderboardFeed};
pub use matching::{MatchMode, ParticipantRegistry, RosterIndex};
pub use provider::{RosterProvider, TelemetryProvider};
pub use providers::{FileProvider, HttpProvider};
pub use view::{LeaderboardFilter, LeaderboardViewEntry};

/// Unified entry point for leaderboard feeds and rosters.
///
/// # Examples
///
/// ```rust,no_run
/// use pitboard::{Pitboard, Settings};
///
/// # #[tokio::main]
/// # async fn main() -> pitboard::Result<()> {
/// let settings = Settings::from_yaml_str("server_url: http://localhost:8772/api/live-timings/leaderboard.json")?;
/// let feed = Pitboard::connect(&settings)?;
/// let roster = Pitboard::roster(&settings).await?;
/// # Ok(())
/// # }
/// ```
pub struct Pitboard;

impl Pitboard {
    /// Start a feed polling the configured server over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or the HTTP client cannot
    /// be built.
    pub fn connect(settings: &Settings) -> Result<LeaderboardFeed> {
        settings.validate()?;
        let provider = HttpProvider::new()?;
        Ok(LeaderboardFeed::spawn(provider, FeedOptions::from(settings)))
    }

    /// Start a feed reading a recorded payload file.
    ///
    /// The file is re-read on every refresh.
    pub fn open<P: AsRef<std::path::Path>>(path: P, settings: &Settings) -> LeaderboardFeed {
        let options =
            FeedOptions { server_url: path.as_ref().display().to_string(), ..FeedOptions::from(settings) };
        LeaderboardFeed::spawn(FileProvider::new(), options)
    }

    /// Load the configured roster over HTTP.
    ///
    /// A blank roster URL yields an empty registry.
    pub async fn roster(settings: &Settings) -> Result<ParticipantRegistry<HttpProvider>> {
        let registry = ParticipantRegistry::new(HttpProvider::new()?);
        registry.load(&settings.participants_csv_url).await;
        Ok(registry)
    }
}
