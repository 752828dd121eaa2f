//! The fixed fleet every session starts from.

use chrono::{DateTime, Utc};

use super::sensor::{Coordinate, SensorRecord, SensorStatus};

/// (id, name, lat, lng, turbidity, status, battery, temperature)
///
/// Battery levels are demo values; the surveyed fleet data has no battery
/// readings.
type FleetEntry = (&'static str, &'static str, f64, f64, f64, SensorStatus, u8, f64);

const FLEET: [FleetEntry; 10] = [
    ("sensor-010", "Sensor 10", 52.212594, 0.120016, 52.0, SensorStatus::Online, 91, 17.6),
    ("sensor-009", "Sensor 9", 52.193370, 0.113725, 49.0, SensorStatus::Online, 78, 16.9),
    ("sensor-008", "Sensor 8", 52.206431, 0.113938, 53.0, SensorStatus::Offline, 12, 17.4),
    ("sensor-007", "Sensor 7", 52.201783, 0.115586, 47.0, SensorStatus::Offline, 0, 17.0),
    ("sensor-006", "Sensor 6", 52.211626, 0.129384, 50.0, SensorStatus::Maintenance, 64, 17.8),
    ("sensor-001", "Sensor 1", 52.190591, 0.104566, 60.0, SensorStatus::Online, 87, 18.5),
    ("sensor-002", "Sensor 2", 52.181721, 0.098732, 45.0, SensorStatus::Offline, 23, 17.2),
    ("sensor-003", "Sensor 3", 52.208200, 0.115700, 72.0, SensorStatus::Maintenance, 55, 19.0),
    ("sensor-004", "Sensor 4", 52.220000, 0.155244, 55.0, SensorStatus::Online, 69, 16.8),
    ("sensor-005", "Sensor 5", 52.212892, 0.142584, 38.0, SensorStatus::Online, 95, 18.0),
];

/// Ten sensors along the River Cam, all stamped with `now`.
pub fn default_fleet(now: DateTime<Utc>) -> Vec<SensorRecord> {
    FLEET
        .iter()
        .map(|&(id, name, lat, lng, turbidity, status, battery, temperature)| {
            SensorRecord::new(
                id,
                name,
                Coordinate::new(lat, lng),
                turbidity,
                temperature,
                status,
                now,
            )
            .with_battery(battery)
        })
        .collect()
}
