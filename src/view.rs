//! Client-side leaderboard view
//!
//! Filters, orders and decorates processed entries for display. The pipeline
//! is applied in a fixed order:
//!
//! 1. Class filter (only with class grouping enabled)
//! 2. Registered-only filter (only with participants filtering enabled)
//! 3. Free-text search over driver, team, car name and car model
//! 4. Sort by the selected field and direction
//!
//! Positions and pace metrics are computed over the filtered list, so the
//! leader of a class view is the fastest car in that class.

use serde::{Deserialize, Serialize};

use crate::matching::{MatchMode, RosterIndex};
use crate::transform::{EntryMetrics, best_overall_lap, entry_metrics, sort_entries};
use crate::types::{ProcessedEntry, SortOrder};

/// Class selection that disables class filtering.
pub const ALL_CLASSES: &str = "All";

/// User-controlled view filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "camelCase", default)]
pub struct LeaderboardFilter {
    /// Class name or [`ALL_CLASSES`]
    pub selected_class: String,
    pub registered_only: bool,
    pub search_query: String,
    pub sort: SortOrder,
    /// Whether class rules are configured and the class selector is offered
    pub class_grouping: bool,
    /// Whether a roster is configured and the registered-only toggle is offered
    pub participants_filtering: bool,
}

impl Default for LeaderboardFilter {
    fn default() -> Self {
        Self {
            selected_class: ALL_CLASSES.to_string(),
            registered_only: false,
            search_query: String::new(),
            sort: SortOrder::default(),
            class_grouping: true,
            participants_filtering: true,
        }
    }
}

/// One displayed row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardViewEntry {
    pub entry: ProcessedEntry,
    /// 1-based position in the filtered list
    pub position: usize,
    pub is_registered: bool,
    pub metrics: EntryMetrics,
}

impl LeaderboardFilter {
    /// Turn class grouping on or off; turning it off resets the selection.
    pub fn set_class_grouping(&mut self, enabled: bool) {
        self.class_grouping = enabled;
        if !enabled {
            self.selected_class = ALL_CLASSES.to_string();
        }
    }

    pub fn toggle_sort_direction(&mut self) {
        self.sort.direction = self.sort.direction.toggled();
    }

    /// Filter and sort `entries`.
    pub fn apply<F>(&self, entries: &[ProcessedEntry], is_registered: F) -> Vec<ProcessedEntry>
    where
        F: Fn(&ProcessedEntry) -> bool,
    {
        let class_filter = self.class_grouping && self.selected_class != ALL_CLASSES;
        let registered_filter = self.participants_filtering && self.registered_only;
        let query = self.search_query.trim().to_lowercase();

        let mut filtered: Vec<ProcessedEntry> = entries
            .iter()
            .filter(|entry| !class_filter || entry.car_class == self.selected_class)
            .filter(|entry| !registered_filter || is_registered(*entry))
            .filter(|entry| matches_search(entry, &query))
            .cloned()
            .collect();

        sort_entries(&mut filtered, self.sort);
        filtered
    }

    /// Filter, sort and decorate `entries` for display.
    pub fn build_view<F>(
        &self,
        entries: &[ProcessedEntry],
        is_registered: F,
        pace_percent_threshold: u32,
    ) -> Vec<LeaderboardViewEntry>
    where
        F: Fn(&ProcessedEntry) -> bool,
    {
        let filtered = self.apply(entries, &is_registered);
        let leader = best_overall_lap(&filtered);

        filtered
            .into_iter()
            .enumerate()
            .map(|(index, entry)| LeaderboardViewEntry {
                position: index + 1,
                is_registered: is_registered(&entry),
                metrics: entry_metrics(&entry, leader, pace_percent_threshold),
                entry,
            })
            .collect()
    }

    /// [`build_view`](Self::build_view) with registration taken from a roster.
    pub fn build_roster_view(
        &self,
        entries: &[ProcessedEntry],
        roster: &RosterIndex,
        mode: MatchMode,
        pace_percent_threshold: u32,
    ) -> Vec<LeaderboardViewEntry> {
        self.build_view(entries, |entry| roster.is_registered(entry, mode), pace_percent_threshold)
    }
}

/// Class selector options: `All` followed by each class in entry order.
pub fn available_classes(entries: &[ProcessedEntry], class_grouping: bool) -> Vec<String> {
    let mut classes = vec![ALL_CLASSES.to_string()];
    if !class_grouping {
        return classes;
    }

    for entry in entries {
        if !classes[1..].contains(&entry.car_class) {
            classes.push(entry.car_class.clone());
        }
    }
    classes
}

fn matches_search(entry: &ProcessedEntry, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    [&entry.driver_name, &entry.team_name, &entry.car_name, &entry.car_model]
        .iter()
        .any(|field| field.to_lowercase().contains(query))
}
