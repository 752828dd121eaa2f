//! Sensor records as held by the store and exchanged with every view.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ordered list of sensor records at a point in time.
///
/// Order is store insertion order and is preserved by every update.
pub type Snapshot = Vec<SensorRecord>;

/// Geographic position of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Operational status of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Online,
    Offline,
    Maintenance,
}

impl SensorStatus {
    /// All statuses in display order.
    pub const ALL: [SensorStatus; 3] =
        [SensorStatus::Online, SensorStatus::Offline, SensorStatus::Maintenance];

    /// Lowercase name, as used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorStatus::Online => "online",
            SensorStatus::Offline => "offline",
            SensorStatus::Maintenance => "maintenance",
        }
    }

    /// Capitalised label for display.
    pub fn label(&self) -> &'static str {
        match self {
            SensorStatus::Online => "Online",
            SensorStatus::Offline => "Offline",
            SensorStatus::Maintenance => "Maintenance",
        }
    }

    /// Explanation shown on the info page.
    pub fn description(&self) -> &'static str {
        match self {
            SensorStatus::Online => "Sensor is active and transmitting data normally",
            SensorStatus::Offline => "Sensor is not responding or has lost connection",
            SensorStatus::Maintenance => "Sensor is undergoing scheduled maintenance or calibration",
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, SensorStatus::Online)
    }
}

impl fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(SensorStatus::Online),
            "offline" => Ok(SensorStatus::Offline),
            "maintenance" => Ok(SensorStatus::Maintenance),
            other => Err(format!("Unknown sensor status: {}", other)),
        }
    }
}

/// A single turbidity sensor and its latest readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorRecord {
    /// Unique identifier within the store.
    pub id: String,
    /// Display name.
    pub name: String,
    pub location: Coordinate,
    /// Turbidity in NTU. Never negative.
    pub turbidity: f64,
    /// Water temperature in °C.
    pub water_temperature: f64,
    pub status: SensorStatus,
    /// Battery charge in percent, when the sensor reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<u8>,
    pub last_updated: DateTime<Utc>,
}

impl SensorRecord {
    /// Create a record with no battery reading.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        location: Coordinate,
        turbidity: f64,
        water_temperature: f64,
        status: SensorStatus,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
            turbidity: turbidity.max(0.0),
            water_temperature,
            status,
            battery_level: None,
            last_updated,
        }
    }

    /// Attach a battery reading, clamped to 0..=100.
    pub fn with_battery(mut self, level: u8) -> Self {
        self.battery_level = Some(level.min(100));
        self
    }

    pub fn is_online(&self) -> bool {
        self.status.is_online()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> SensorRecord {
        SensorRecord::new(
            "sensor-001",
            "Sensor 1",
            Coordinate::new(52.190591, 0.104566),
            60.0,
            18.5,
            SensorStatus::Online,
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        )
        .with_battery(87)
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["waterTemperature"], 18.5);
        assert_eq!(json["batteryLevel"], 87);
        assert_eq!(json["status"], "online");
        assert_eq!(json["lastUpdated"], "2025-06-01T12:00:00Z");
        assert_eq!(json["location"]["lat"], 52.190591);
    }

    #[test]
    fn test_missing_battery_is_optional() {
        let json = r#"{
            "id": "sensor-008",
            "name": "Sensor 8",
            "location": { "lat": 52.206431, "lng": 0.113938 },
            "turbidity": 53,
            "waterTemperature": 17.4,
            "status": "offline",
            "lastUpdated": "2025-06-01T12:00:00.000Z"
        }"#;

        let record: SensorRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.battery_level, None);
        assert_eq!(record.status, SensorStatus::Offline);
        assert_eq!(record.turbidity, 53.0);
    }

    #[test]
    fn test_new_clamps_negative_turbidity() {
        let record = SensorRecord::new(
            "s",
            "s",
            Coordinate::new(0.0, 0.0),
            -3.0,
            10.0,
            SensorStatus::Online,
            Utc::now(),
        );
        assert_eq!(record.turbidity, 0.0);
    }

    #[test]
    fn test_battery_is_clamped() {
        assert_eq!(sample().with_battery(250).battery_level, Some(100));
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Online".parse::<SensorStatus>(), Ok(SensorStatus::Online));
        assert_eq!(" maintenance ".parse::<SensorStatus>(), Ok(SensorStatus::Maintenance));
        assert!("broken".parse::<SensorStatus>().is_err());
    }
}
