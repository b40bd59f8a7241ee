//! Normalized roster participants

use serde::{Deserialize, Serialize};

use crate::matching::tokens::{has_declared_car, normalize_text, to_car_tokens, to_name_key};
use crate::schema::RawParticipant;

/// Roster participant reduced to the keys used for registration matching.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct NormalizedParticipant {
    /// Word-order independent name key, see [`to_name_key`]
    pub name_key: String,
    /// Trimmed, lowercased class
    pub car_class: String,
    /// Whether the roster names a specific car
    pub has_declared_car: bool,
    /// Car name tokens, see [`to_car_tokens`]
    pub car_tokens: Vec<String>,
}

impl From<&RawParticipant> for NormalizedParticipant {
    fn from(participant: &RawParticipant) -> Self {
        Self {
            name_key: to_name_key(&participant.driver),
            car_class: normalize_text(&participant.car_class),
            has_declared_car: has_declared_car(&participant.car),
            car_tokens: to_car_tokens(&participant.car),
        }
    }
}
