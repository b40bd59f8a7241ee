//! Car class rules

use serde::{Deserialize, Serialize};

/// Class assigned when no rule matches.
pub const FALLBACK_CAR_CLASS: &str = "Other";

/// A named car class and the substrings that identify it.
///
/// Patterns are matched case-insensitively against both the car display name
/// and the car model key. Rules are evaluated in list order and the first
/// match wins.
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct CarClassRule {
    pub name: String,
    pub patterns: Vec<String>,
}

impl CarClassRule {
    pub fn new<I, S>(name: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { name: name.into(), patterns: patterns.into_iter().map(Into::into).collect() }
    }
}
