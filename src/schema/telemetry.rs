//! Live timings leaderboard payload
//!
//! This module mirrors the JSON document served by the simulator's
//! `live-timings/leaderboard.json` endpoint. Every field is optional on the
//! wire; missing values are represented as `None` and resolved by the
//! normalizer, never rejected here.
//!
//! Times are reported in nanoseconds. A value at or above
//! [`crate::transform::SENTINEL_NS`] means "no time recorded".

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Top-level leaderboard document
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct LeaderboardData {
    /// Drivers currently connected to the server
    pub connected_drivers: Option<Vec<Driver>>,
    /// Drivers that left the server but still hold times
    pub disconnected_drivers: Option<Vec<Driver>>,
    /// Server display name
    pub server_name: Option<String>,
    /// Track identifier
    pub track: Option<String>,
    /// Session name
    pub name: Option<String>,
}

impl LeaderboardData {
    /// Parse a leaderboard document from JSON text.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Connected drivers followed by disconnected drivers.
    pub fn drivers(&self) -> impl Iterator<Item = &Driver> {
        self.connected_drivers
            .iter()
            .flatten()
            .chain(self.disconnected_drivers.iter().flatten())
    }
}

/// One driver record with the cars they have driven this session
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Driver {
    /// Identity block; absent for some disconnected entries
    pub car_info: Option<CarInfo>,
    /// Per car-model timing data, in payload order
    pub cars: Option<OrderedMap<CarData>>,
}

/// Driver identity
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct CarInfo {
    /// Driver name as entered in the simulator
    pub driver_name: String,
    /// Team name (may be empty)
    pub team_name: String,
    /// Steam GUID
    #[serde(rename = "DriverGUID")]
    pub driver_guid: String,
}

/// Timing data for one car model driven by one driver
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct CarData {
    /// Car display name
    pub car_name: Option<String>,
    /// Best lap in nanoseconds
    #[serde(deserialize_with = "lenient_time")]
    pub best_lap: Option<i64>,
    /// Best sector times across all laps, keyed by sector index
    pub best_splits: Option<OrderedMap<Option<SplitTime>>>,
    /// Sector times of the best lap, keyed by sector index
    pub best_lap_splits: Option<OrderedMap<Option<SplitTime>>>,
    /// Completed laps
    #[serde(deserialize_with = "lenient_count")]
    pub num_laps: Option<u32>,
}

/// Sector split entry
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SplitTime {
    /// Split time in nanoseconds
    #[serde(deserialize_with = "lenient_time")]
    pub split_time: Option<i64>,
}

/// Nanosecond time that tolerates floats and out-of-range values.
///
/// Anything that does not fit an `i64` reads as "no time" instead of failing
/// the whole document.
fn lenient_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(serde_json::Value::as_number).and_then(number_to_i64))
}

/// Lap count; negative or unrepresentable counts read as missing.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_number)
        .and_then(number_to_i64)
        .and_then(|count| u32::try_from(count).ok()))
}

fn number_to_i64(number: &serde_json::Number) -> Option<i64> {
    if let Some(value) = number.as_i64() {
        return Some(value);
    }
    if number.is_u64() {
        return None;
    }
    // i64::MAX is not exactly representable; its f64 rounds up to 2^63
    number.as_f64().filter(|value| value.is_finite() && value.abs() < i64::MAX as f64).map(|value| value.round() as i64)
}

/// JSON object decoded as key/value pairs in document order.
///
/// Car maps are iterated in the order the server wrote them, which in turn
/// fixes the relative order of entries without a lap time.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    /// Iterate pairs in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, value)| (key, value)))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    pairs.push((key, value));
                }
                Ok(OrderedMap(pairs))
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}
