//! Leaderboard transformation pipeline
//!
//! Pure functions that turn a raw [`LeaderboardData`] payload into ordered,
//! classified [`ProcessedEntry`] rows and derive pace metrics from them.
//!
//! ```text
//! payload ──► normalize (ns → ms, splits, classify) ──► sort ──► metrics
//! ```
//!
//! Every stage recomputes from its input; nothing is cached between calls, so
//! processing the same payload twice yields identical output.

pub mod classifier;
pub mod normalizer;
pub mod pace;
pub mod sorter;

pub use classifier::classify_car;
pub use normalizer::{SENTINEL_NS, UNKNOWN_DRIVER, normalize_leaderboard, ns_to_ms, split_times, theoretical_best_lap};
pub use pace::{
    BadgeSeverity, DEFAULT_PACE_PERCENT_THRESHOLD, EntryMetrics, NO_SECTOR_DATA, WARNING_BAND_OFFSET, best_overall_lap,
    classify_pace, delta_to_leader, entry_metrics, pace_percentage, tooltip_text, warning_threshold,
};
pub use sorter::{compare_best_lap, compare_entries, sort_by_best_lap, sort_entries};

use crate::schema::LeaderboardData;
use crate::types::{CarClassRule, ProcessedEntry, ProcessedLeaderboard};

/// Normalize, classify and sort a payload into leaderboard order.
pub fn process_leaderboard(data: &LeaderboardData, rules: &[CarClassRule]) -> Vec<ProcessedEntry> {
    let mut entries = normalize_leaderboard(data, rules);
    sort_by_best_lap(&mut entries);
    entries
}

/// Process a payload into a snapshot carrying the session metadata.
pub fn process_payload(data: &LeaderboardData, rules: &[CarClassRule]) -> ProcessedLeaderboard {
    ProcessedLeaderboard {
        leaderboard: process_leaderboard(data, rules),
        server_name: data.server_name.clone().unwrap_or_default(),
        track: data.track.clone().unwrap_or_default(),
        session_name: data.name.clone().unwrap_or_default(),
        last_update_unix_ms: None,
        error: None,
    }
}
