//! Telemetry normalization
//!
//! Converts the nanosecond live timings payload into [`ProcessedEntry`] rows:
//! one row per driver per car, times in milliseconds, split arrays ordered by
//! sector index, and the class resolved inline.

use std::collections::HashSet;
use tracing::{debug, warn};

use super::classifier::classify_car;
use crate::schema::{CarData, Driver, LeaderboardData, OrderedMap, SplitTime};
use crate::types::{CarClassRule, ProcessedEntry};

/// Nanosecond value the server uses for "no time recorded" (~2^31 seconds).
///
/// Any time at or above this value is treated as absent.
pub const SENTINEL_NS: i64 = 2_147_483_647_000_000;

/// Driver name used when the identity block is missing.
pub const UNKNOWN_DRIVER: &str = "Unknown";

const NS_PER_MS: i64 = 1_000_000;

/// Convert a nanosecond time to rounded milliseconds.
///
/// Returns `None` for absent values and sentinel values.
pub fn ns_to_ms(ns: Option<i64>) -> Option<i64> {
    let ns = ns?;
    if ns >= SENTINEL_NS {
        return None;
    }
    // Round half up, matching the server's own rounding
    Some((ns + NS_PER_MS / 2).div_euclid(NS_PER_MS))
}

/// Convert a sparse sector map into a dense array ordered by sector index.
///
/// Missing and sentinel entries stay in place as `None`; the array is never
/// compacted. Keys that are not numbers sort after all numeric keys.
pub fn split_times(splits: Option<&OrderedMap<Option<SplitTime>>>) -> Vec<Option<i64>> {
    let Some(splits) = splits else {
        return Vec::new();
    };

    let mut indexed: Vec<(Option<i64>, Option<i64>)> = splits
        .iter()
        .map(|(key, split)| {
            let index = key.trim().parse::<i64>().ok();
            let time = split.as_ref().and_then(|split| split.split_time);
            (index, time)
        })
        .collect();

    // Stable sort: numeric keys ascending, then unparseable keys in payload order
    indexed.sort_by_key(|(index, _)| (index.is_none(), *index));

    indexed.into_iter().map(|(_, time)| ns_to_ms(time)).collect()
}

/// Sum of all splits, only when every sector has a time.
pub fn theoretical_best_lap(splits: &[Option<i64>]) -> Option<i64> {
    if splits.is_empty() {
        return None;
    }
    splits.iter().copied().sum()
}

/// Flatten a leaderboard payload into unsorted entries.
///
/// Connected drivers are processed before disconnected ones, and each driver's
/// cars in payload order. Classification is applied per entry.
pub fn normalize_leaderboard(data: &LeaderboardData, rules: &[CarClassRule]) -> Vec<ProcessedEntry> {
    let mut entries = Vec::new();
    for driver in data.drivers() {
        entries.extend(normalize_driver(driver, rules));
    }

    warn_on_duplicate_ids(&entries);
    debug!(entries = entries.len(), "Normalized leaderboard payload");

    entries
}

/// Produce one entry per car driven by `driver`.
pub fn normalize_driver<'a>(
    driver: &'a Driver,
    rules: &'a [CarClassRule],
) -> impl Iterator<Item = ProcessedEntry> + 'a {
    let (driver_name, team_name, driver_guid) = match &driver.car_info {
        Some(info) => (info.driver_name.as_str(), info.team_name.as_str(), info.driver_guid.as_str()),
        None => (UNKNOWN_DRIVER, "", ""),
    };

    driver.cars.iter().flat_map(|cars| cars.iter()).map(move |(car_model, car)| {
        normalize_car(driver_name, team_name, driver_guid, car_model, car, rules)
    })
}

fn normalize_car(
    driver_name: &str,
    team_name: &str,
    driver_guid: &str,
    car_model: &str,
    car: &CarData,
    rules: &[CarClassRule],
) -> ProcessedEntry {
    let car_name = match car.car_name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => car_model,
    };

    let splits = split_times(car.best_splits.as_ref());
    let best_lap_splits = split_times(car.best_lap_splits.as_ref());
    let theoretical_best_lap = theoretical_best_lap(&splits);

    ProcessedEntry {
        id: format!("{driver_guid}_{car_model}"),
        driver_name: driver_name.to_string(),
        car_name: car_name.to_string(),
        car_model: car_model.to_string(),
        car_class: classify_car(car_name, car_model, rules).to_string(),
        team_name: team_name.to_string(),
        best_lap: ns_to_ms(car.best_lap),
        splits,
        best_lap_splits,
        theoretical_best_lap,
        lap_count: car.num_laps.unwrap_or(0),
    }
}

// Ids are kept as `{guid}_{model}` even when two anonymous drivers collide
fn warn_on_duplicate_ids(entries: &[ProcessedEntry]) {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.id.as_str()) {
            warn!(id = %entry.id, "Duplicate leaderboard entry id in payload");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CarBuilder, DriverBuilder, payload};
    use proptest::prelude::*;

    #[test]
    fn converts_best_lap_to_milliseconds() {
        assert_eq!(ns_to_ms(Some(95_234_000_000)), Some(95_234));
        assert_eq!(ns_to_ms(Some(2_147_483_647_000_001)), None);
        assert_eq!(ns_to_ms(Some(SENTINEL_NS)), None);
        assert_eq!(ns_to_ms(None), None);
    }

    #[test]
    fn rounds_to_nearest_millisecond() {
        assert_eq!(ns_to_ms(Some(95_234_499_999)), Some(95_234));
        assert_eq!(ns_to_ms(Some(95_234_500_000)), Some(95_235));
    }

    #[test]
    fn theoretical_best_requires_every_split() {
        assert_eq!(theoretical_best_lap(&[Some(30_000), Some(31_000), Some(32_000)]), Some(93_000));
        assert_eq!(theoretical_best_lap(&[Some(30_000), None, Some(32_000)]), None);
        assert_eq!(theoretical_best_lap(&[None, Some(31_000), Some(32_000)]), None);
        assert_eq!(theoretical_best_lap(&[]), None);
    }

    #[test]
    fn splits_are_ordered_by_numeric_index() {
        let splits: OrderedMap<Option<SplitTime>> = [10, 2, 0, 1]
            .into_iter()
            .map(|index| {
                (index.to_string(), Some(SplitTime { split_time: Some((index + 1) * 1_000_000_000) }))
            })
            .collect();

        assert_eq!(
            split_times(Some(&splits)),
            vec![Some(1_000), Some(2_000), Some(3_000), Some(11_000)]
        );
    }

    #[test]
    fn missing_and_sentinel_splits_keep_their_slot() {
        let splits: OrderedMap<Option<SplitTime>> = vec![
            ("0".to_string(), Some(SplitTime { split_time: Some(30_000_000_000) })),
            ("1".to_string(), Some(SplitTime { split_time: Some(SENTINEL_NS) })),
            ("2".to_string(), None),
            ("3".to_string(), Some(SplitTime { split_time: None })),
        ]
        .into_iter()
        .collect();

        assert_eq!(split_times(Some(&splits)), vec![Some(30_000), None, None, None]);
        assert!(split_times(None).is_empty());
    }

    #[test]
    fn driver_without_identity_is_unknown() {
        let data = payload(
            vec![DriverBuilder::anonymous().car("ks_bmw_m4_gt3", CarBuilder::new("BMW M4 GT3"))],
            vec![],
        );
        let entries = normalize_leaderboard(&data, &[]);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].driver_name, "Unknown");
        assert_eq!(entries[0].team_name, "");
        assert_eq!(entries[0].id, "_ks_bmw_m4_gt3");
    }

    #[test]
    fn driver_without_cars_contributes_nothing() {
        let data = payload(vec![DriverBuilder::new("Ivan Ivanov", "guid-1")], vec![]);
        assert!(normalize_leaderboard(&data, &[]).is_empty());
    }

    #[test]
    fn one_entry_per_car_in_payload_order() {
        let data = payload(
            vec![
                DriverBuilder::new("Ivan Ivanov", "guid-1")
                    .team("Team A")
                    .car("ks_porsche_cayman_gt4", CarBuilder::new("Porsche Cayman GT4").laps(3))
                    .car("ks_audi_r8_lms", CarBuilder::new("Audi R8 LMS").best_lap_ms(120_000)),
            ],
            vec![DriverBuilder::new("Petr Petrov", "guid-2").car("ks_audi_r8_lms", CarBuilder::default())],
        );

        let entries = normalize_leaderboard(&data, &[]);
        let ids: Vec<&str> = entries.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["guid-1_ks_porsche_cayman_gt4", "guid-1_ks_audi_r8_lms", "guid-2_ks_audi_r8_lms"]);

        assert_eq!(entries[0].team_name, "Team A");
        assert_eq!(entries[0].lap_count, 3);
        assert_eq!(entries[0].best_lap, None);
        assert_eq!(entries[1].best_lap, Some(120_000));
        // Car name falls back to the model key
        assert_eq!(entries[2].car_name, "ks_audi_r8_lms");
        assert_eq!(entries[2].lap_count, 0);
    }

    #[test]
    fn classifies_each_entry() {
        let rules = vec![crate::types::CarClassRule::new("Silver", ["SUPER-PRODUCTION"])];
        let data = payload(
            vec![
                DriverBuilder::new("A", "a")
                    .car("lada_vesta", CarBuilder::new("LADA Vesta NG Super-production"))
                    .car("ks_bmw_m4_gt3", CarBuilder::new("BMW M4 GT3")),
            ],
            vec![],
        );

        let classes: Vec<String> =
            normalize_leaderboard(&data, &rules).into_iter().map(|entry| entry.car_class).collect();
        assert_eq!(classes, vec!["Silver", "Other"]);
    }

    #[test]
    fn populates_theoretical_best_from_best_splits() {
        let data = payload(
            vec![DriverBuilder::new("A", "a").car(
                "car",
                CarBuilder::new("Car")
                    .best_splits_ms(&[Some(30_000), Some(31_000), Some(32_000)])
                    .best_lap_splits_ms(&[Some(30_100), Some(31_200), None]),
            )],
            vec![],
        );

        let entry = &normalize_leaderboard(&data, &[])[0];
        assert_eq!(entry.splits, vec![Some(30_000), Some(31_000), Some(32_000)]);
        assert_eq!(entry.best_lap_splits, vec![Some(30_100), Some(31_200), None]);
        assert_eq!(entry.theoretical_best_lap, Some(93_000));
    }

    #[test]
    fn malformed_car_numbers_do_not_drop_other_entries() {
        let json = r#"{"ConnectedDrivers": [
            { "CarInfo": { "DriverName": "A", "DriverGUID": "a" },
              "Cars": { "bad": { "CarName": "Bad", "BestLap": 18446744073709551615, "NumLaps": -1 } } },
            { "CarInfo": { "DriverName": "B", "DriverGUID": "b" },
              "Cars": { "good": { "CarName": "Good", "BestLap": 95234000000.0, "NumLaps": 5 } } }
        ]}"#;
        let data = LeaderboardData::from_json(json).expect("malformed numbers are tolerated");

        let entries = normalize_leaderboard(&data, &[]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "a_bad");
        assert_eq!(entries[0].best_lap, None);
        assert_eq!(entries[0].lap_count, 0);
        assert_eq!(entries[1].best_lap, Some(95_234));
        assert_eq!(entries[1].lap_count, 5);
    }

    #[test]
    fn colliding_anonymous_ids_are_preserved() {
        let data = payload(
            vec![
                DriverBuilder::anonymous().car("ks_mazda_mx5_cup", CarBuilder::default()),
                DriverBuilder::anonymous().car("ks_mazda_mx5_cup", CarBuilder::default()),
            ],
            vec![],
        );

        let entries = normalize_leaderboard(&data, &[]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, entries[1].id);
    }

    proptest! {
        #[test]
        fn valid_times_round_trip_within_half_a_millisecond(ns in 0i64..SENTINEL_NS) {
            let ms = ns_to_ms(Some(ns)).expect("below sentinel");
            prop_assert!((ms * NS_PER_MS - ns).abs() <= NS_PER_MS / 2);
        }

        #[test]
        fn sentinel_and_above_is_always_absent(ns in SENTINEL_NS..i64::MAX - NS_PER_MS) {
            prop_assert_eq!(ns_to_ms(Some(ns)), None);
        }

        #[test]
        fn theoretical_best_is_some_iff_all_present(
            splits in prop::collection::vec(prop::option::of(0i64..200_000), 1..8)
        ) {
            let all_present = splits.iter().all(Option::is_some);
            let result = theoretical_best_lap(&splits);
            prop_assert_eq!(result.is_some(), all_present);
            if let Some(sum) = result {
                prop_assert_eq!(sum, splits.iter().flatten().sum::<i64>());
            }
        }
    }
}
