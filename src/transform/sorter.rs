//! Leaderboard ordering
//!
//! All sorts are stable and recomputed from scratch on every call. The default
//! lap time order places entries without a time after every timed entry and
//! keeps untimed entries in their input order.

use std::cmp::Ordering;

use crate::types::{ProcessedEntry, SortDirection, SortField, SortOrder};

/// Compare two optional lap times, `None` after every `Some`.
pub fn compare_best_lap(left: Option<i64>, right: Option<i64>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(&right),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

// Case-insensitive first so "de Vries" sits next to "De Vries"
fn compare_driver_names(left: &str, right: &str) -> Ordering {
    left.to_lowercase().cmp(&right.to_lowercase()).then_with(|| left.cmp(right))
}

/// Compare two entries under a sort selection.
///
/// The direction negates the field comparison uniformly, for every field.
pub fn compare_entries(left: &ProcessedEntry, right: &ProcessedEntry, order: SortOrder) -> Ordering {
    let ordering = match order.field {
        SortField::LapTime => compare_best_lap(left.best_lap, right.best_lap),
        SortField::Driver => compare_driver_names(&left.driver_name, &right.driver_name),
        SortField::Laps => right.lap_count.cmp(&left.lap_count),
    };

    match order.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Sort entries in place under a sort selection.
pub fn sort_entries(entries: &mut [ProcessedEntry], order: SortOrder) {
    entries.sort_by(|left, right| compare_entries(left, right, order));
}

/// Canonical leaderboard order: best lap ascending, untimed entries last.
pub fn sort_by_best_lap(entries: &mut [ProcessedEntry]) {
    sort_entries(entries, SortOrder::default());
}
