//! Canonical leaderboard entries

use serde::{Deserialize, Serialize};

/// One leaderboard row: a single driver in a single car.
///
/// All times are milliseconds. `None` means the source reported no time
/// (absent or sentinel value).
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct ProcessedEntry {
    /// `{driver_guid}_{car_model}`
    pub id: String,
    pub driver_name: String,
    pub car_name: String,
    pub car_model: String,
    /// Resolved class name, or `Other`
    pub car_class: String,
    pub team_name: String,
    pub best_lap: Option<i64>,
    /// Best split per sector across all laps, ordered by sector index
    pub splits: Vec<Option<i64>>,
    /// Splits of the actual best lap, ordered by sector index
    pub best_lap_splits: Vec<Option<i64>>,
    /// Sum of `splits` when every sector has a time
    pub theoretical_best_lap: Option<i64>,
    pub lap_count: u32,
}

impl ProcessedEntry {
    /// Whether any sector data is available for this entry.
    pub fn has_splits(&self) -> bool {
        !self.splits.is_empty() || !self.best_lap_splits.is_empty()
    }
}

/// Processed leaderboard snapshot with session metadata.
///
/// A failed load is still a snapshot: the leaderboard is empty, metadata is
/// blank and `error` carries the reason.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct ProcessedLeaderboard {
    pub leaderboard: Vec<ProcessedEntry>,
    pub server_name: String,
    pub track: String,
    pub session_name: String,
    /// Unix time in milliseconds when the snapshot was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_unix_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessedLeaderboard {
    /// Snapshot describing a failed load.
    pub fn failed(error: impl Into<String>) -> Self {
        Self { error: Some(error.into()), ..Self::default() }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
