//! Registration matching against a normalized roster

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::tokens::{MIN_CAR_TOKEN_OVERLAP, has_car_token_overlap, normalize_text, to_car_tokens, to_name_key};
use crate::schema::RawParticipant;
use crate::types::{NormalizedParticipant, ProcessedEntry};

/// How strictly an entry must agree with a roster row.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub enum MatchMode {
    /// Name, class and (when declared) car must agree
    #[default]
    Strict,
    /// Any roster row with the same name key matches
    NameOnly,
}

impl MatchMode {
    pub fn from_name_only(name_only: bool) -> Self {
        if name_only { MatchMode::NameOnly } else { MatchMode::Strict }
    }
}

/// Roster participants grouped by name key.
#[derive(Default, Debug, Clone)]
pub struct RosterIndex {
    by_name: HashMap<String, Vec<NormalizedParticipant>>,
    len: usize,
}

impl RosterIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize and index raw roster rows.
    pub fn from_participants(participants: &[RawParticipant]) -> Self {
        participants.iter().map(NormalizedParticipant::from).collect()
    }

    pub fn insert(&mut self, participant: NormalizedParticipant) {
        self.by_name.entry(participant.name_key.clone()).or_default().push(participant);
        self.len += 1;
    }

    /// Number of participants, counting every row sharing a name.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Roster rows whose name key equals the key of `driver_name`.
    pub fn candidates(&self, driver_name: &str) -> &[NormalizedParticipant] {
        self.by_name.get(&to_name_key(driver_name)).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether a leaderboard entry belongs to a registered participant.
    pub fn is_registered(&self, entry: &ProcessedEntry, mode: MatchMode) -> bool {
        if self.is_empty() {
            return false;
        }

        let candidates = self.candidates(&entry.driver_name);
        if candidates.is_empty() {
            return false;
        }
        if mode == MatchMode::NameOnly {
            return true;
        }

        let entry_class = normalize_text(&entry.car_class);
        let entry_tokens = to_car_tokens(&entry.car_name);

        candidates.iter().any(|candidate| matches_candidate(candidate, &entry_class, &entry_tokens))
    }
}

impl FromIterator<NormalizedParticipant> for RosterIndex {
    fn from_iter<I: IntoIterator<Item = NormalizedParticipant>>(iter: I) -> Self {
        let mut index = RosterIndex::new();
        for participant in iter {
            index.insert(participant);
        }
        index
    }
}

/// Strict check of one same-name roster row.
///
/// The class must match. A row without a declared car matches on class alone;
/// otherwise the car names must share [`MIN_CAR_TOKEN_OVERLAP`] tokens.
pub fn matches_candidate(candidate: &NormalizedParticipant, entry_class: &str, entry_tokens: &[String]) -> bool {
    if candidate.car_class != entry_class {
        return false;
    }
    if !candidate.has_declared_car {
        return true;
    }
    has_car_token_overlap(&candidate.car_tokens, entry_tokens, MIN_CAR_TOKEN_OVERLAP)
}
