//! Pace metrics relative to the session leader
//!
//! Metrics are computed over the entries currently shown, so the "leader" is
//! the fastest visible lap, not necessarily the fastest lap in the payload.

use serde::{Deserialize, Serialize};

use crate::format::{format_delta, format_time};
use crate::types::ProcessedEntry;

/// Default pace threshold in percent of the leader's lap.
pub const DEFAULT_PACE_PERCENT_THRESHOLD: u32 = 107;

/// Width of the warning band below the pace threshold, in percentage points.
pub const WARNING_BAND_OFFSET: u32 = 2;

/// Tooltip shown when an entry has no sector data at all.
pub const NO_SECTOR_DATA: &str = "No sector data";

/// Badge severity for an entry's pace percentage.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub enum BadgeSeverity {
    /// Within the warning threshold, or no percentage
    #[default]
    Normal,
    /// Above the warning threshold, at or below the pace threshold
    Warning,
    /// Above the pace threshold
    Destructive,
}

/// Derived display metrics for one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct EntryMetrics {
    /// Best lap as a percentage of the leader's best lap
    pub percentage: Option<f64>,
    /// Gap to the leader, never negative
    pub delta_to_leader_ms: Option<i64>,
    /// `+S.mmm` or `-`
    pub delta_text: String,
    pub severity: BadgeSeverity,
    /// Sector breakdown, one line per split kind
    pub tooltip_text: String,
    pub has_splits: bool,
}

/// Fastest non-null best lap among `entries`.
pub fn best_overall_lap<'a, I>(entries: I) -> Option<i64>
where
    I: IntoIterator<Item = &'a ProcessedEntry>,
{
    entries.into_iter().filter_map(|entry| entry.best_lap).min()
}

/// Best lap as a percentage of the leader's lap.
pub fn pace_percentage(best_lap: Option<i64>, best_overall_lap: Option<i64>) -> Option<f64> {
    match (best_lap, best_overall_lap) {
        (Some(lap), Some(leader)) if leader > 0 => Some(lap as f64 * 100.0 / leader as f64),
        _ => None,
    }
}

/// Gap to the leader in milliseconds, clamped at zero.
pub fn delta_to_leader(best_lap: Option<i64>, best_overall_lap: Option<i64>) -> Option<i64> {
    match (best_lap, best_overall_lap) {
        (Some(lap), Some(leader)) => Some((lap - leader).max(0)),
        _ => None,
    }
}

/// Lower edge of the warning band: `max(100, threshold - 2)`.
pub fn warning_threshold(pace_percent_threshold: u32) -> u32 {
    pace_percent_threshold.saturating_sub(WARNING_BAND_OFFSET).max(100)
}

/// Classify a pace percentage against the threshold.
pub fn classify_pace(percentage: Option<f64>, pace_percent_threshold: u32) -> BadgeSeverity {
    let Some(percentage) = percentage else {
        return BadgeSeverity::Normal;
    };

    let threshold = f64::from(pace_percent_threshold);
    let warning = f64::from(warning_threshold(pace_percent_threshold));

    if percentage > threshold {
        BadgeSeverity::Destructive
    } else if percentage > warning {
        BadgeSeverity::Warning
    } else {
        BadgeSeverity::Normal
    }
}

/// Sector tooltip: `Best:` splits of the best lap, `Theor:` best splits.
pub fn tooltip_text(entry: &ProcessedEntry) -> String {
    let mut lines = Vec::with_capacity(2);

    if !entry.best_lap_splits.is_empty() {
        lines.push(format!("Best: {}", join_splits(&entry.best_lap_splits)));
    }
    if !entry.splits.is_empty() {
        lines.push(format!("Theor: {}", join_splits(&entry.splits)));
    }

    if lines.is_empty() { NO_SECTOR_DATA.to_string() } else { lines.join("\n") }
}

fn join_splits(splits: &[Option<i64>]) -> String {
    splits.iter().map(|split| format_time(*split)).collect::<Vec<_>>().join(" | ")
}

/// Compute all display metrics for one entry.
pub fn entry_metrics(
    entry: &ProcessedEntry,
    best_overall_lap: Option<i64>,
    pace_percent_threshold: u32,
) -> EntryMetrics {
    let percentage = pace_percentage(entry.best_lap, best_overall_lap);
    let delta_to_leader_ms = delta_to_leader(entry.best_lap, best_overall_lap);

    EntryMetrics {
        percentage,
        delta_to_leader_ms,
        delta_text: format_delta(delta_to_leader_ms),
        severity: classify_pace(percentage, pace_percent_threshold),
        tooltip_text: tooltip_text(entry),
        has_splits: entry.has_splits(),
    }
}
