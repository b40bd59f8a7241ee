//! Fixture builders for payloads and entries
//!
//! Builders take millisecond values and write nanoseconds into the payload,
//! the way the timing server reports them.

#![cfg(any(test, feature = "benchmark"))]

use crate::schema::{CarData, CarInfo, Driver, LeaderboardData, OrderedMap, SplitTime};
use crate::types::ProcessedEntry;

const NS_PER_MS: i64 = 1_000_000;

/// Builder for one driver record.
#[derive(Debug, Clone, Default)]
pub struct DriverBuilder {
    info: Option<CarInfo>,
    cars: Vec<(String, CarData)>,
}

impl DriverBuilder {
    pub fn new(name: &str, guid: &str) -> Self {
        Self {
            info: Some(CarInfo {
                driver_name: name.to_string(),
                team_name: String::new(),
                driver_guid: guid.to_string(),
            }),
            cars: Vec::new(),
        }
    }

    /// Driver without an identity block.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn team(mut self, team: &str) -> Self {
        if let Some(info) = self.info.as_mut() {
            info.team_name = team.to_string();
        }
        self
    }

    pub fn car(mut self, model: &str, car: CarBuilder) -> Self {
        self.cars.push((model.to_string(), car.build()));
        self
    }

    pub fn build(self) -> Driver {
        let cars = if self.cars.is_empty() { None } else { Some(self.cars.into_iter().collect()) };
        Driver { car_info: self.info, cars }
    }
}

/// Builder for one car's timing data.
#[derive(Debug, Clone, Default)]
pub struct CarBuilder {
    data: CarData,
}

impl CarBuilder {
    pub fn new(name: &str) -> Self {
        Self { data: CarData { car_name: Some(name.to_string()), ..CarData::default() } }
    }

    pub fn laps(mut self, laps: u32) -> Self {
        self.data.num_laps = Some(laps);
        self
    }

    pub fn best_lap_ms(self, ms: i64) -> Self {
        self.best_lap_ns(ms * NS_PER_MS)
    }

    pub fn best_lap_ns(mut self, ns: i64) -> Self {
        self.data.best_lap = Some(ns);
        self
    }

    pub fn best_splits_ms(mut self, splits: &[Option<i64>]) -> Self {
        self.data.best_splits = Some(split_map(splits));
        self
    }

    pub fn best_lap_splits_ms(mut self, splits: &[Option<i64>]) -> Self {
        self.data.best_lap_splits = Some(split_map(splits));
        self
    }

    pub fn build(self) -> CarData {
        self.data
    }
}

fn split_map(splits: &[Option<i64>]) -> OrderedMap<Option<SplitTime>> {
    splits
        .iter()
        .enumerate()
        .map(|(index, ms)| (index.to_string(), ms.map(|ms| SplitTime { split_time: Some(ms * NS_PER_MS) })))
        .collect()
}

/// Assemble a payload from connected and disconnected drivers.
pub fn payload(connected: Vec<DriverBuilder>, disconnected: Vec<DriverBuilder>) -> LeaderboardData {
    LeaderboardData {
        connected_drivers: Some(connected.into_iter().map(DriverBuilder::build).collect()),
        disconnected_drivers: Some(disconnected.into_iter().map(DriverBuilder::build).collect()),
        ..LeaderboardData::default()
    }
}

/// Minimal processed entry with the given id and best lap.
pub fn entry(id: &str, best_lap: Option<i64>) -> ProcessedEntry {
    ProcessedEntry {
        id: id.to_string(),
        driver_name: format!("Driver {id}"),
        car_name: "Car".to_string(),
        car_model: "car".to_string(),
        car_class: "Other".to_string(),
        best_lap,
        ..ProcessedEntry::default()
    }
}

/// Deterministic full grid for benchmarks.
///
/// Every fifth car has no lap time and every seventh driver is disconnected.
pub fn synthetic_payload(drivers: usize, cars_per_driver: usize) -> LeaderboardData {
    const MODELS: [(&str, &str); 4] = [
        ("ks_ferrari_296_gt3", "Ferrari 296 GT3"),
        ("ks_porsche_cayman_gt4", "Porsche Cayman GT4"),
        ("lada_vesta_ng", "LADA Vesta NG Super-production"),
        ("ks_mazda_mx5_cup", "Mazda MX-5 Cup"),
    ];

    let mut connected = Vec::new();
    let mut disconnected = Vec::new();

    for d in 0..drivers {
        let mut driver = DriverBuilder::new(&format!("driver {d} surname{d}"), &format!("7656{d:013}"));
        for c in 0..cars_per_driver {
            let (model, name) = MODELS[(d + c) % MODELS.len()];
            let seed = (d * 31 + c * 17) as i64;
            let mut car = CarBuilder::new(name)
                .laps((seed % 25) as u32)
                .best_splits_ms(&[Some(30_000 + seed * 7), Some(40_000 + seed * 3), Some(29_000 + seed)]);
            if (d + c) % 5 != 0 {
                car = car
                    .best_lap_ms(99_000 + seed * 11)
                    .best_lap_splits_ms(&[Some(30_100 + seed * 7), Some(40_200 + seed * 3), Some(29_300 + seed)]);
            }
            driver = driver.car(&format!("{model}_{c}"), car);
        }

        if d % 7 == 6 {
            disconnected.push(driver);
        } else {
            connected.push(driver);
        }
    }

    payload(connected, disconnected)
}
